use super::ContractEmail;

pub fn contract_email_subject(contract_number: &str) -> String {
    format!("Contrato Assinado - {contract_number}")
}

/// HTML body of the signed-contract email
pub fn contract_email_html(email: &ContractEmail) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>
    body {{ font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background: linear-gradient(135deg, #2563eb 0%, #7c3aed 100%); color: white; padding: 30px; border-radius: 10px 10px 0 0; text-align: center; }}
    .content {{ background: #ffffff; padding: 30px; border: 1px solid #e5e7eb; border-top: none; }}
    .contract-info {{ background: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0; }}
    .info-label {{ font-weight: 600; color: #6b7280; }}
    .success-badge {{ background: #10b981; color: white; padding: 8px 16px; border-radius: 20px; font-weight: 600; }}
    .footer {{ background: #f9fafb; padding: 20px; border-radius: 0 0 10px 10px; text-align: center; color: #6b7280; font-size: 14px; }}
  </style>
</head>
<body>
  <div class="header">
    <h1>Parabéns, {first_name}!</h1>
    <p>Seu contrato foi assinado com sucesso</p>
  </div>
  <div class="content">
    <p>Olá <strong>{name}</strong>,</p>
    <p>É com grande satisfação que confirmamos a assinatura do seu contrato. Agora você já pode aproveitar todos os benefícios do seu plano!</p>
    <div class="contract-info">
      <h3>Informações do Contrato</h3>
      <p><span class="info-label">Número do Contrato:</span> <strong>{number}</strong></p>
      <p><span class="info-label">Plano:</span> {plan}</p>
      <p><span class="info-label">Valor:</span> <strong>{value}</strong></p>
      <p><span class="info-label">Status:</span> <span class="success-badge">Assinado</span></p>
    </div>
    <p><strong>Anexo:</strong> Uma cópia do seu contrato está anexada a este e-mail em formato PDF. Guarde este documento para referência futura.</p>
    <p>Atenciosamente,<br><strong>Equipe de Contratos</strong></p>
  </div>
  <div class="footer">
    <p>Este é um e-mail automático. Por favor, não responda.</p>
  </div>
</body>
</html>
"#,
        first_name = escape(email.first_name()),
        name = escape(&email.to_name),
        number = escape(&email.contract_number),
        plan = escape(&email.plan_name),
        value = escape(&email.plan_value),
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_body_mentions_contract_and_escapes_input() {
        let email = ContractEmail {
            to_email: "a@b.com".to_string(),
            to_name: "Ana <b>Souza</b>".to_string(),
            contract_number: "CTR-20250601-0007".to_string(),
            plan_name: "Plano Premium".to_string(),
            plan_value: "R$ 99,90/mês".to_string(),
            pdf_path: PathBuf::new(),
        };

        let html = contract_email_html(&email);
        assert!(html.contains("Parabéns, Ana!"));
        assert!(html.contains("CTR-20250601-0007"));
        assert!(html.contains("Ana &lt;b&gt;Souza&lt;/b&gt;"));
        assert!(!html.contains("<b>Souza"));
        assert_eq!(contract_email_subject("CTR-1"), "Contrato Assinado - CTR-1");
    }
}
