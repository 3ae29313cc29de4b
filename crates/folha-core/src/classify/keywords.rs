//! Keyword profiles for direct and OCR text.

/// Payroll indicators for machine-extracted text.
pub const PAYROLL_KEYWORDS: &[&str] = &[
    "PROVENTOS",
    "DESCONTOS",
    "HORAS NORMAIS",
    "SALÁRIO",
    "SALARIO",
    "0020HORAS NORMAIS",
    "0060DESC",
    "FOLHA",
    "HOLERITE",
    "VENCIMENTOS",
    "0020",
    "0060",
    "FOLHA DE PAGAMENTO",
    "CONTRA CHEQUE",
    "CONTRA-CHEQUE",
    "VALOR",
    "QUANTIDADE",
    "TOTAL",
    "LIQUIDO",
    "LÍQUIDO",
    "BRUTO",
];

/// Time card indicators for machine-extracted text.
pub const TIME_CARD_KEYWORDS: &[&str] = &[
    "MÊS/AN",
    "MES/AN",
    "ENTRADA",
    "SAÍDA",
    "SAIDA",
    "CARTÃO DE PONTO",
    "CARTAO DE PONTO",
    "PONTO",
    "HORÁRIO",
    "HORARIO",
    "SEG",
    "TER",
    "QUA",
    "QUI",
    "SEX",
    "SAB",
    "DOM",
    "SEGUNDA",
    "TERÇA",
    "TERCA",
    "QUARTA",
    "QUINTA",
    "SEXTA",
    "SÁBADO",
    "SABADO",
    "DOMINGO",
    "CHECK-IN",
    "CHECK-OUT",
    "INTERVALO",
    "ATN",
    "HE",
    "HORAS EXTRAS",
];

/// Reduced payroll set for OCR text.
pub const OCR_PAYROLL_KEYWORDS: &[&str] = &[
    "PROVENTOS",
    "DESCONTOS",
    "HORAS NORMAIS",
    "SALÁRIO",
    "FOLHA",
    "HOLERITE",
];

/// Reduced time card set for OCR text.
pub const OCR_TIME_CARD_KEYWORDS: &[&str] = &[
    "MÊS/ANO", "ENTRADA", "SAÍDA", "PONTO", "SEG", "TER", "QUA", "QUI", "SEX",
];

/// Keyword lists and the hit counts that make a classification confident.
#[derive(Debug, Clone)]
pub struct KeywordProfile {
    pub payroll: Vec<String>,
    pub payroll_threshold: usize,
    pub time_card: Vec<String>,
    pub time_card_threshold: usize,
}

impl KeywordProfile {
    pub fn new(
        payroll: &[&str],
        payroll_threshold: usize,
        time_card: &[&str],
        time_card_threshold: usize,
    ) -> Self {
        Self {
            payroll: payroll.iter().map(|k| k.to_string()).collect(),
            payroll_threshold,
            time_card: time_card.iter().map(|k| k.to_string()).collect(),
            time_card_threshold,
        }
    }

    /// Profile for machine-extracted text.
    pub fn standard() -> Self {
        Self::new(PAYROLL_KEYWORDS, 3, TIME_CARD_KEYWORDS, 2)
    }

    /// Profile for OCR text. A single payroll hit is enough.
    pub fn ocr() -> Self {
        Self::new(OCR_PAYROLL_KEYWORDS, 1, OCR_TIME_CARD_KEYWORDS, 2)
    }
}

/// Keywords of `keywords` contained in already uppercased text.
pub fn matched_keywords(upper_text: &str, keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| upper_text.contains(k.as_str()))
        .cloned()
        .collect()
}
