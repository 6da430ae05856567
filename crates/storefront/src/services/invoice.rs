//! Invoice document generation.
//!
//! Renders a completed order as a paginated PDF: store header, order
//! metadata, customer block, itemized table, and the grand total. The
//! total is printed from the order's stored amount - it is never
//! recomputed here, so the invoice cannot drift from what was submitted.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::services::checkout::CompletedOrder;

/// Errors from invoice rendering.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// PDF generation failed.
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 15.0;
const BOTTOM_LIMIT: f32 = 30.0;
const ROW_HEIGHT: f32 = 8.0;

/// Table column x positions (product, qty, unit price, line total).
const COLUMNS: [f32; 4] = [15.0, 110.0, 135.0, 168.0];

/// Deterministic download filename for an order's invoice.
#[must_use]
pub fn invoice_filename(order_id: &str) -> String {
    format!("Invoice_Order_{order_id}.pdf")
}

/// Render a completed order as a PDF byte stream.
///
/// # Errors
///
/// Returns `InvoiceError::Pdf` if document assembly fails.
pub fn render_invoice(order: &CompletedOrder) -> Result<Vec<u8>, InvoiceError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Invoice {}", order.order_id),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique)?;

    let mut writer = InvoiceWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - 20.0,
    };

    // Store header
    writer.text_centered("Tech Gadgets Store", 20.0, &bold);
    writer.advance(8.0);
    writer.text_centered("Your Trusted Electronics Partner", 12.0, &regular);
    writer.advance(10.0);
    writer.rule();
    writer.advance(10.0);
    writer.text_centered("INVOICE", 18.0, &bold);
    writer.advance(13.0);

    // Order metadata
    for line in [
        format!("Order ID: {}", order.order_id),
        format!("Tracking ID: {}", order.tracking_id),
        format!(
            "Transaction ID: {}",
            order.transaction_id.as_deref().unwrap_or("-")
        ),
        format!("Payment Method: {}", order.payment_method),
        format!(
            "Order Date: {}",
            order.placed_at.format("%Y-%m-%d %H:%M UTC")
        ),
    ] {
        writer.text(&line, 12.0, &regular);
        writer.advance(ROW_HEIGHT);
    }
    writer.advance(8.0);

    // Customer block
    writer.text("Customer Details", 14.0, &bold);
    writer.advance(ROW_HEIGHT);
    for line in [
        format!("Name: {}", order.customer.name),
        format!("Address: {}", order.customer.address),
        format!("City: {}", order.customer.city),
        format!("Email: {}", order.customer.email),
        format!("Phone: {}", order.customer.phone),
    ] {
        writer.text(&line, 12.0, &regular);
        writer.advance(ROW_HEIGHT);
    }
    writer.advance(8.0);

    // Itemized table
    writer.text("Order Items", 13.0, &bold);
    writer.advance(ROW_HEIGHT);
    writer.table_row(&["Product", "Qty", "Price", "Total"], &bold);
    writer.advance(2.0);
    writer.rule();
    writer.advance(ROW_HEIGHT - 2.0);

    for item in &order.items {
        writer.table_row(
            &[
                &item.product.name,
                &item.quantity.to_string(),
                &money(item.product.price),
                &money(item.line_total()),
            ],
            &regular,
        );
        writer.advance(ROW_HEIGHT);
    }

    // Grand total, printed from the order's stored amount
    writer.advance(4.0);
    writer.text(&format!("Total Amount: {}", money(order.total)), 14.0, &bold);

    // Footer on the last page
    writer.layer.use_text(
        "Thank you for shopping with Tech Gadgets Store!",
        10.0,
        Mm(centered_x("Thank you for shopping with Tech Gadgets Store!", 10.0)),
        Mm(10.0),
        &italic,
    );

    Ok(doc.save_to_bytes()?)
}

/// Format a money amount for the invoice.
///
/// The built-in PDF fonts are WinAnsi-encoded and cannot represent the
/// rupee sign, so amounts are prefixed with "Rs.".
fn money(amount: Decimal) -> String {
    format!("Rs. {amount}")
}

/// Approximate x position that centers `text` on the page.
///
/// Helvetica averages roughly half the point size per glyph; exact metrics
/// are not worth carrying for a fixed header.
fn centered_x(text: &str, font_size: f32) -> f32 {
    const PT_TO_MM: f32 = 0.352_778;
    #[allow(clippy::cast_precision_loss)] // header strings are short
    let width = text.len() as f32 * font_size * 0.5 * PT_TO_MM;
    ((PAGE_WIDTH - width) / 2.0).max(MARGIN_LEFT)
}

/// Cursor-style writer that paginates as it descends the page.
struct InvoiceWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl InvoiceWriter<'_> {
    fn advance(&mut self, by: f32) {
        self.y -= by;
        if self.y < BOTTOM_LIMIT {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - 20.0;
        }
    }

    fn text(&self, text: &str, size: f32, font: &IndirectFontRef) {
        self.layer
            .use_text(text, size, Mm(MARGIN_LEFT), Mm(self.y), font);
    }

    fn text_centered(&self, text: &str, size: f32, font: &IndirectFontRef) {
        self.layer
            .use_text(text, size, Mm(centered_x(text, size)), Mm(self.y), font);
    }

    fn table_row(&self, cells: &[&str; 4], font: &IndirectFontRef) {
        for (cell, x) in cells.iter().zip(COLUMNS) {
            self.layer.use_text(*cell, 11.0, Mm(x), Mm(self.y), font);
        }
    }

    fn rule(&self) {
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(self.y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN_RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::types::{CartItem, CustomerDetails, ProductSummary};
    use chrono::Utc;
    use tech_gadgets_core::{PaymentMethod, ProductId};

    fn order(item_count: usize) -> CompletedOrder {
        let items = (0..item_count)
            .map(|i| {
                let id = i32::try_from(i).unwrap_or(i32::MAX);
                CartItem {
                    product: ProductSummary {
                        id: ProductId::new(id),
                        name: format!("Widget {i}"),
                        price: Decimal::from(500),
                        image_url: format!("widget{i}.jpg"),
                    },
                    quantity: 2,
                }
            })
            .collect();

        CompletedOrder {
            order_id: "ORDER_1700000000000".to_string(),
            tracking_id: "TRK_1700000000000".to_string(),
            transaction_id: None,
            items,
            total: Decimal::from(1000),
            payment_method: PaymentMethod::CashOnDelivery,
            customer: CustomerDetails {
                name: "Asha".to_string(),
                address: "12 MG Road".to_string(),
                city: "Bengaluru".to_string(),
                email: "asha@example.com".to_string(),
                pincode: "560001".to_string(),
                phone: "9876543210".to_string(),
            },
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render_invoice(&order(1)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_paginates_long_item_lists() {
        let short = render_invoice(&order(1)).unwrap();
        let long = render_invoice(&order(60)).unwrap();
        // More items means more pages, never a failure
        assert!(long.len() > short.len());
    }

    #[test]
    fn test_invoice_filename_is_deterministic() {
        assert_eq!(
            invoice_filename("ORDER_1700000000000"),
            "Invoice_Order_ORDER_1700000000000.pdf"
        );
    }

    #[test]
    fn test_money_format_avoids_non_winansi_symbols() {
        assert_eq!(money(Decimal::from(1000)), "Rs. 1000");
    }
}
