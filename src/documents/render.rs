use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rgb,
};

use super::DocumentError;
use crate::models::{Client, Contract};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const VALUE_COLUMN: f32 = MARGIN + 50.0;
const BODY_WRAP: usize = 90;
/// Characters that fit between `VALUE_COLUMN` and the right margin at 10pt
const ROW_WRAP: usize = 64;

const CLAUSES: &[(&str, &str)] = &[
    (
        "2. OBJETO DO CONTRATO",
        "O presente contrato tem por objeto a prestação de serviços conforme o plano contratado, \
         incluindo todos os benefícios e condições especificados na proposta comercial.",
    ),
    (
        "3. VIGÊNCIA",
        "Este contrato terá vigência de 12 (doze) meses a partir da data de assinatura, \
         renovável automaticamente por igual período, salvo manifestação em contrário de \
         qualquer das partes.",
    ),
    (
        "5. OBRIGAÇÕES DO CONTRATANTE",
        "O contratante se obriga a: (a) efetuar o pagamento nas datas acordadas; \
         (b) fornecer informações verdadeiras e atualizadas; \
         (c) utilizar os serviços de acordo com os termos estabelecidos.",
    ),
    (
        "6. OBRIGAÇÕES DA CONTRATADA",
        "A contratada se obriga a: (a) prestar os serviços com qualidade e eficiência; \
         (b) manter a confidencialidade das informações do contratante; \
         (c) disponibilizar suporte técnico durante o horário comercial.",
    ),
    (
        "7. RESCISÃO",
        "O presente contrato poderá ser rescindido por qualquer das partes mediante aviso \
         prévio de 30 (trinta) dias, sem prejuízo das obrigações já assumidas até a data da \
         rescisão.",
    ),
    (
        "8. FORO",
        "Fica eleito o foro da comarca da sede da contratada para dirimir quaisquer dúvidas \
         ou controvérsias oriundas do presente contrato.",
    ),
];

fn render_err(e: printpdf::Error) -> DocumentError {
    DocumentError::Render(e.to_string())
}

/// Top-down text cursor that starts a new page when it runs out of room
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl<'a> Cursor<'a> {
    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&mut self, text: &str, size: f32, bold: bool, x: f32) {
        let line_height = size * 0.5;
        self.ensure_room(line_height);
        self.y -= line_height;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn heading(&mut self, text: &str, size: f32) {
        self.gap(3.0);
        self.layer.set_fill_color(Color::Rgb(Rgb::new(0.12, 0.25, 0.69, None)));
        self.text(text, size, true, MARGIN);
        self.layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.gap(2.0);
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap(text, BODY_WRAP) {
            self.text(&line, 11.0, false, MARGIN);
        }
        self.gap(3.0);
    }

    /// Label in the left column, value wrapped under `VALUE_COLUMN`
    fn row(&mut self, label: &str, value: &str) {
        let lines = wrap(value, ROW_WRAP);
        let mut lines = lines.iter().map(String::as_str);

        self.ensure_room(5.0);
        self.y -= 5.0;
        self.layer.use_text(label, 10.0, Mm(MARGIN), Mm(self.y), &self.bold);
        self.layer.use_text(
            lines.next().unwrap_or_default(),
            10.0,
            Mm(VALUE_COLUMN),
            Mm(self.y),
            &self.regular,
        );
        for line in lines {
            self.ensure_room(5.0);
            self.y -= 5.0;
            self.layer.use_text(line, 10.0, Mm(VALUE_COLUMN), Mm(self.y), &self.regular);
        }
    }

    fn centered(&mut self, text: &str, size: f32, bold: bool) {
        // Helvetica averages roughly half an em per glyph.
        let width = text.chars().count() as f32 * size * 0.5 * 0.3528;
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        self.text(text, size, bold, x);
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Greedy word wrap on character count. Words longer than `width` are
/// split into `width`-sized pieces.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(width) {
            if current_len > 0 && current_len + 1 + piece.len() > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece.len();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(super) fn contract_pdf(
    client: &Client,
    contract: &Contract,
    issued_on: NaiveDate,
) -> Result<Vec<u8>, DocumentError> {
    let title = format!("Contrato {}", contract.number);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_err)?;
    let issued = issued_on.format("%d/%m/%Y").to_string();

    let mut cursor = Cursor {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN,
        regular,
        bold,
    };

    cursor.centered("CONTRATO DE ADESÃO", 18.0, true);
    cursor.heading(&format!("Nº {}", contract.number), 14.0);
    cursor.row("Data de Emissão:", &issued);
    cursor.row("Plano Contratado:", &contract.plan_name);
    cursor.row("Valor:", &contract.plan_value);

    cursor.heading("1. DADOS DO CONTRATANTE", 14.0);
    let address = &client.address;
    let cpf = client.cpf.to_string();
    let street = format!("{}, {}", address.street, address.number);
    let city = format!("{}/{}", address.city, address.state);
    let rows: [(&str, &str); 9] = [
        ("Nome Completo:", &client.full_name),
        ("CPF:", &cpf),
        ("E-mail:", &client.email),
        ("Celular:", &client.phone),
        ("Endereço:", &street),
        ("Complemento:", address.complement.as_deref().unwrap_or("N/A")),
        ("Bairro:", &address.district),
        ("Cidade/UF:", &city),
        ("CEP:", &address.postal_code),
    ];
    for (label, value) in rows {
        cursor.row(label, value);
    }

    if let Some(plate) = client.vehicle.plate.as_deref() {
        cursor.gap(4.0);
        cursor.text("Dados do Veículo", 11.0, true, MARGIN);
        let vehicle = &client.vehicle;
        cursor.row("Placa:", plate);
        cursor.row("Modelo:", vehicle.model.as_deref().unwrap_or("N/A"));
        cursor.row("Marca:", vehicle.make.as_deref().unwrap_or("N/A"));
        cursor.row("Ano:", vehicle.year.as_deref().unwrap_or("N/A"));
    }

    let (object, validity) = (CLAUSES[0], CLAUSES[1]);
    for (heading, body) in [object, validity] {
        cursor.heading(heading, 14.0);
        cursor.paragraph(body);
    }
    cursor.heading("4. VALOR E FORMA DE PAGAMENTO", 14.0);
    cursor.paragraph(&format!(
        "O valor do plano contratado é de {}, a ser pago mensalmente através de boleto \
         bancário ou cartão de crédito, com vencimento no dia 10 de cada mês.",
        contract.plan_value
    ));
    for (heading, body) in &CLAUSES[2..] {
        cursor.heading(heading, 14.0);
        cursor.paragraph(body);
    }

    cursor.gap(8.0);
    cursor.paragraph(&format!(
        "Por estarem justos e contratados, assinam o presente instrumento em {issued}."
    ));
    cursor.gap(12.0);
    cursor.centered(&"_".repeat(50), 10.0, false);
    for line in wrap(&client.full_name, BODY_WRAP) {
        cursor.centered(&line, 10.0, true);
    }
    cursor.centered(&format!("CPF: {cpf}"), 10.0, false);
    cursor.centered("Contratante", 10.0, false);

    drop(cursor);
    doc.save_to_bytes().map_err(render_err)
}
