//! Contact encoders for the CSV and vCard 3.0 export formats.
//!
//! Both encoders are pure: the same contacts always produce the same text.

use std::collections::HashSet;

use crate::domain::{ContactRecord, ExportFormat};

/// Fixed CSV header, emitted even when there are no contacts.
pub const CSV_HEADER: &str = "Name,First Name,Last Name,Phone,Email,Company";

/// Separator for multi-valued CSV cells.
const CSV_MULTI_SEPARATOR: &str = "; ";

/// Encodes contacts in the given format.
#[must_use]
pub fn encode(format: ExportFormat, contacts: &[ContactRecord]) -> String {
    match format {
        ExportFormat::Csv => encode_csv(contacts),
        ExportFormat::Vcf => encode_vcf(contacts),
    }
}

/// Encodes contacts as CSV: one header row plus one six-field row per contact.
///
/// Phones and emails are joined with `"; "` before escaping. Rows are
/// joined with `\n` and there is no trailing newline.
#[must_use]
pub fn encode_csv(contacts: &[ContactRecord]) -> String {
    let mut rows = Vec::with_capacity(contacts.len() + 1);
    rows.push(CSV_HEADER.to_string());

    for contact in contacts {
        let phone = contact.phone_numbers.join(CSV_MULTI_SEPARATOR);
        let email = contact.emails.join(CSV_MULTI_SEPARATOR);

        let row = [
            escape_csv(&contact.display_name),
            escape_csv(&contact.first_name),
            escape_csv(&contact.last_name),
            escape_csv(&phone),
            escape_csv(&email),
            escape_csv(&contact.company),
        ];

        rows.push(row.join(","));
    }

    rows.join("\n")
}

/// Quotes a CSV field if it contains a comma, quote or newline.
#[must_use]
pub fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Encodes contacts as concatenated vCard 3.0 blocks.
///
/// Empty input yields an empty string.
#[must_use]
pub fn encode_vcf(contacts: &[ContactRecord]) -> String {
    let mut out = String::new();

    for contact in contacts {
        out.push_str("BEGIN:VCARD\n");
        out.push_str("VERSION:3.0\n");
        out.push_str(&format!("FN:{}\n", contact.display_name));
        out.push_str(&format!(
            "N:{};{};;;\n",
            contact.last_name, contact.first_name
        ));

        for number in unique_phone_numbers(&contact.phone_numbers) {
            out.push_str(&format!("TEL;TYPE=CELL:{number}\n"));
        }

        // Emails travel as one ';'-joined value and are split back apart.
        let email = contact.emails.join(";");
        if !email.is_empty() {
            for mail in email.split(';') {
                out.push_str(&format!("EMAIL:{mail}\n"));
            }
        }

        if !contact.company.is_empty() {
            out.push_str(&format!("ORG:{}\n", contact.company));
        }

        out.push_str("END:VCARD\n");
    }

    out
}

/// Trimmed, non-empty phone numbers in first-seen order without duplicates.
fn unique_phone_numbers(numbers: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    numbers
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(*n))
        .collect()
}
