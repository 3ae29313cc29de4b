//! Cleanup of raw and OCR text before classification and OCR-sourced parsing.

use super::patterns::DECIMAL_PUNCTUATION;

/// Accented Portuguese letters kept by the normalizer.
pub const ACCENTED_LETTERS: &str = "ÁÉÍÓÚÂÊÎÔÛÀÈÌÒÙÃÕÇáéíóúâêîôûàèìòùãõç";

/// Punctuation kept by the normalizer.
pub const ALLOWED_PUNCTUATION: &str = ":/-.,()";

/// Whether `c` survives normalization.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || ACCENTED_LETTERS.contains(c) || ALLOWED_PUNCTUATION.contains(c)
}

/// Whether `c` is part of a word. Everything else is a boundary.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ACCENTED_LETTERS.contains(c)
}

/// Normalize raw text for pattern matching.
///
/// Steps: line breaks and tabs become spaces, spaces collapse, OCR letter
/// confusions in code positions are fixed, decimal punctuation becomes a
/// comma, disallowed characters become spaces, whitespace collapses again.
/// Normalizing already normalized text returns it unchanged.
pub fn normalize_text(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect();

    let collapsed = collapse_spaces(&spaced);
    let corrected = fix_ocr_confusions(&collapsed);
    let decimals = normalize_decimal_punctuation(&corrected);

    let stripped: String = decimals
        .chars()
        .map(|c| if is_allowed_char(c) { c } else { ' ' })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !previous_space {
                out.push(c);
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out
}

/// Replace a standalone `O`/`I` directly followed by exactly three digits
/// with `0`/`1` ("O020" → "0020", "I510" → "1510").
pub fn fix_ocr_confusions(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let replacement = match c {
            'O' => '0',
            'I' => '1',
            _ => {
                out.push(c);
                continue;
            }
        };

        let starts_word = i == 0 || !is_word_char(chars[i - 1]);
        let digits = chars.get(i + 1..i + 4).is_some_and(|run| run.iter().all(char::is_ascii_digit));
        let ends_word = chars.get(i + 4).is_none_or(|&next| !is_word_char(next));

        if starts_word && digits && ends_word {
            out.push(replacement);
        } else {
            out.push(c);
        }
    }

    out
}

/// Rewrite "digits[.,]dd" followed by a boundary as "digits,dd".
pub fn normalize_decimal_punctuation(text: &str) -> String {
    DECIMAL_PUNCTUATION
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{},{}{}", &caps[1], &caps[2], &caps[3])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize_text("  Mês/Ano:\t01/2024\r\n\n03   SEG  "), "Mês/Ano: 01/2024 03 SEG");
    }

    #[test]
    fn test_ocr_confusions() {
        assert_eq!(normalize_text("O020 Horas Normais"), "0020 Horas Normais");
        assert_eq!(normalize_text("cod I510 bonus"), "cod 1510 bonus");
        // Not a code position
        assert_eq!(normalize_text("OI234 ROI123 O1234"), "OI234 ROI123 O1234");
    }

    #[test]
    fn test_decimal_punctuation() {
        assert_eq!(normalize_text("183.25 11,12"), "183,25 11,12");
        assert_eq!(normalize_text("1.234,56"), "1.234,56");
        assert_eq!(normalize_text("12.345"), "12.345");
        assert_eq!(normalize_text("valor 8.00;"), "valor 8,00");
    }

    #[test]
    fn test_disallowed_characters_become_spaces() {
        assert_eq!(normalize_text("SALÁRIO|BRUTO*R$ 10,00"), "SALÁRIO BRUTO R 10,00");
        assert_eq!(normalize_text("#@!"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "  \t\n",
            "Mês/Ano: 01/2024\n03 SEG 09:50 - 16:06 13:45 - 14:00 610 8.00 1,50 0.00 S",
            "O020Horas Normais183.25 11.12\r\nI314_INSS 1;00 150.00",
            "x_O123_y  I123#  O12.34| 5.67_ 1.23é",
            "Funcionário: JOSÉ DA SILVA ~~ PROVENTOS ¦ DESCONTOS",
            "12.345.67,89 O999\u{a0}I000\u{2003}end",
            "LÍQUIDO....:: 2.037,74 (350.00) [x]",
        ];

        for sample in samples {
            let once = normalize_text(sample);
            let twice = normalize_text(&once);
            assert_eq!(once, twice, "input: {sample:?}");
        }
    }

    #[test]
    fn test_idempotent_on_generated_noise() {
        const ALPHABET: &[char] = &[
            'O', 'I', '0', '1', '2', '5', '9', '.', ',', ':', '/', '-', '_', 'ç', 'Ã', 'é', 'ñ', '\u{a0}', ' ',
            '\n', '\t', '@', '#', '$', '%', '(', ')', 'a', 'S', 'x',
        ];

        // xorshift64, fixed seed so failures reproduce
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        for _ in 0..20_000 {
            let len = (next() % 24) as usize;
            let input: String = (0..len)
                .map(|_| ALPHABET[(next() % ALPHABET.len() as u64) as usize])
                .collect();

            let once = normalize_text(&input);
            assert_eq!(normalize_text(&once), once, "input: {input:?}");
        }
    }
}
