//! Patient facing messages rendered from an `Invoice` and the
//! `Profile` of the clinic that issued it.

use crate::invoice::Invoice;
use crate::profile::Profile;
use handlebars::Handlebars;
use serde_json::json;
use thiserror::Error;

const FALLBACK_CLINIC_NAME: &str = "your clinic";
const FALLBACK_PAYMENT_LINE: &str = "Please make payment at your earliest convenience.";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

fn clinic_name(profile: Option<&Profile>) -> &str {
    profile
        .and_then(|p| p.display_name())
        .unwrap_or(FALLBACK_CLINIC_NAME)
}

fn patient_name(invoice: &Invoice) -> &str {
    invoice
        .patient_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("there")
}

fn payment_line(invoice: &Invoice, profile: Option<&Profile>) -> String {
    match profile.and_then(|p| p.bank_details()) {
        Some(bank) => format!(
            "Please pay by bank transfer to {}, account {}, sort code {}, quoting {}.",
            bank.bank_name, bank.account_number, bank.sort_code, invoice.invoice_number
        ),
        None => FALLBACK_PAYMENT_LINE.to_string(),
    }
}

/// SMS sent when the invoice is first delivered to the patient
pub fn initial_sms(invoice: &Invoice, profile: Option<&Profile>) -> String {
    format!(
        "Hi {}, {} has sent you invoice {} for {}, issued on {}. {} Thank you.",
        patient_name(invoice),
        clinic_name(profile),
        invoice.invoice_number,
        invoice.formatted_amount(),
        invoice.issue_date.format("%d/%m/%Y"),
        payment_line(invoice, profile)
    )
}

/// SMS sent by the follow-up scheduler for an unpaid invoice
pub fn followup_sms(invoice: &Invoice, profile: Option<&Profile>, days_since_issue: i64) -> String {
    format!(
        "Hi {}, this is a reminder from {} that invoice {} for {}, issued {} days ago, is still unpaid. {} Thank you.",
        patient_name(invoice),
        clinic_name(profile),
        invoice.invoice_number,
        invoice.formatted_amount(),
        days_since_issue,
        payment_line(invoice, profile)
    )
}

const INVOICE_EMAIL_TEMPLATE: &str = "invoice_email";
const INVOICE_EMAIL_HTML: &str = r#"<div style="font-family: sans-serif">
<h2>Invoice {{invoice_number}}</h2>
<p>Hi {{patient_name}},</p>
<p>{{clinic_name}} has sent you an invoice for <strong>{{amount}}</strong>, issued on {{issue_date}}.</p>
{{#if bank}}
<p>Please pay by bank transfer using the details below, quoting <strong>{{invoice_number}}</strong> as the reference.</p>
<table>
<tr><td>Bank</td><td>{{bank.name}}</td></tr>
<tr><td>Account number</td><td>{{bank.account_number}}</td></tr>
<tr><td>Sort code</td><td>{{bank.sort_code}}</td></tr>
</table>
{{else}}
<p>{{fallback_payment_line}}</p>
{{/if}}
<p>Thank you,<br/>{{clinic_name}}</p>
</div>"#;

#[derive(Debug, Error)]
pub enum RenderEmailError {
    #[error("invalid email template: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("unable to render email: {0}")]
    Render(#[from] handlebars::RenderError),
}

fn email_registry() -> Result<Handlebars<'static>, RenderEmailError> {
    let mut registry = Handlebars::new();
    registry.register_template_string(INVOICE_EMAIL_TEMPLATE, INVOICE_EMAIL_HTML)?;
    Ok(registry)
}

/// Email sent when the invoice is first delivered to the patient. Every
/// value is HTML escaped by the template engine.
pub fn invoice_email(
    invoice: &Invoice,
    profile: Option<&Profile>,
) -> Result<EmailContent, RenderEmailError> {
    let bank = profile.and_then(|p| p.bank_details()).map(|bank| {
        json!({
            "name": bank.bank_name,
            "account_number": bank.account_number,
            "sort_code": bank.sort_code,
        })
    });
    let data = json!({
        "invoice_number": invoice.invoice_number,
        "patient_name": patient_name(invoice),
        "clinic_name": clinic_name(profile),
        "amount": invoice.formatted_amount(),
        "issue_date": invoice.issue_date.format("%d/%m/%Y").to_string(),
        "bank": bank,
        "fallback_payment_line": FALLBACK_PAYMENT_LINE,
    });

    let html = email_registry()?.render(INVOICE_EMAIL_TEMPLATE, &data)?;
    let subject = format!("Invoice {} from {}", invoice.invoice_number, clinic_name(profile));
    Ok(EmailContent { subject, html })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::entity::ID;
    use chrono::NaiveDate;

    fn setup() -> (Invoice, Profile) {
        let user_id = ID::new();
        let mut invoice = Invoice::new(
            user_id.clone(),
            "INV-7".into(),
            8550,
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            0,
        );
        invoice.patient_name = Some("Sam".into());
        let mut profile = Profile::new(user_id);
        profile.clinic_name = Some("Riverside Physio".into());
        profile.bank_name = Some("Monzo".into());
        profile.bank_account_number = Some("12345678".into());
        profile.bank_sort_code = Some("04-00-04".into());
        (invoice, profile)
    }

    #[test]
    fn followup_sms_contains_bank_details() {
        let (invoice, profile) = setup();
        let sms = followup_sms(&invoice, Some(&profile), 10);
        assert!(sms.starts_with("Hi Sam, this is a reminder from Riverside Physio"));
        assert!(sms.contains("INV-7 for £85.50"));
        assert!(sms.contains("issued 10 days ago"));
        assert!(sms.contains("Monzo, account 12345678, sort code 04-00-04"));
    }

    #[test]
    fn falls_back_without_bank_details_or_profile() {
        let (invoice, mut profile) = setup();
        profile.bank_sort_code = None;
        let sms = followup_sms(&invoice, Some(&profile), 10);
        assert!(sms.contains(FALLBACK_PAYMENT_LINE));
        assert!(!sms.contains("Monzo"));

        let sms = initial_sms(&invoice, None);
        assert!(sms.contains("your clinic has sent you invoice INV-7"));
        assert!(sms.contains("issued on 05/02/2024"));
        assert!(sms.contains(FALLBACK_PAYMENT_LINE));
    }

    #[test]
    fn email_escapes_user_content() {
        let (mut invoice, mut profile) = setup();
        invoice.patient_name = Some("<script>".into());
        profile.clinic_name = Some("Smith & Co".into());
        let email = invoice_email(&invoice, Some(&profile)).unwrap();
        assert_eq!(email.subject, "Invoice INV-7 from Smith & Co");
        assert!(email.html.contains("Hi &lt;script&gt;,"));
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("Smith &amp; Co has sent you an invoice"));
        assert!(email.html.contains("<strong>£85.50</strong>, issued on 05/02/2024"));
        assert!(email.html.contains("<td>12345678</td>"));
        assert!(email.html.contains("<td>04-00-04</td>"));
        assert!(!email.html.contains(FALLBACK_PAYMENT_LINE));
    }

    #[test]
    fn email_without_bank_details_asks_for_payment() {
        let (invoice, mut profile) = setup();
        profile.bank_name = None;
        let email = invoice_email(&invoice, Some(&profile)).unwrap();
        assert!(email.html.contains("Hi Sam,"));
        assert!(email.html.contains(FALLBACK_PAYMENT_LINE));
        assert!(!email.html.contains("<table>"));

        let email = invoice_email(&invoice, None).unwrap();
        assert_eq!(email.subject, "Invoice INV-7 from your clinic");
        assert!(email.html.contains("Thank you,<br/>your clinic"));
    }
}
