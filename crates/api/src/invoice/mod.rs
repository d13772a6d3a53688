mod create_invoice;
mod get_invoice;
mod get_invoice_reminders;
mod mark_invoice_paid;
mod send_invoice;

use actix_web::web;
use clinic_domain::{Invoice, ID};
use clinic_infra::ClinicContext;
use create_invoice::create_invoice_controller;
use get_invoice::get_invoice_controller;
use get_invoice_reminders::get_invoice_reminders_controller;
use mark_invoice_paid::mark_invoice_paid_controller;
use send_invoice::send_invoice_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/invoices", web::post().to(create_invoice_controller));
    cfg.route(
        "/invoices/{invoice_id}",
        web::get().to(get_invoice_controller),
    );
    cfg.route(
        "/invoices/{invoice_id}/reminders",
        web::get().to(get_invoice_reminders_controller),
    );
    cfg.route(
        "/invoices/{invoice_id}/paid",
        web::put().to(mark_invoice_paid_controller),
    );
    cfg.route(
        "/invoices/{invoice_id}/send",
        web::post().to(send_invoice_controller),
    );
}

/// Finds the invoice if it exists and is owned by the user
async fn find_user_invoice(user_id: &ID, invoice_id: &ID, ctx: &ClinicContext) -> Option<Invoice> {
    ctx.repos
        .invoices
        .find(invoice_id)
        .await
        .filter(|invoice| &invoice.user_id == user_id)
}
