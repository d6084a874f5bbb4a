//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{CartError, CartLedger},
    pricing::CheckoutTotals,
    products::Catalog,
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line total.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One cart line as printed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product name snapshot
    pub name: String,

    /// Category snapshot
    pub category: String,

    /// Unit price snapshot
    pub unit_price: Money<'a, Currency>,

    /// Quantity
    pub quantity: u32,

    /// Unit price times quantity
    pub line_total: Money<'a, Currency>,

    /// Live catalog discount, if the product still has one
    pub discount: Option<Percentage>,
}

/// Itemised summary of a checkout evaluation.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 8]>,
    totals: CheckoutTotals<'a>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for a cart and the totals computed from it.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total overflows.
    pub fn new(
        cart: &CartLedger<'a>,
        catalog: &impl Catalog<'a>,
        totals: CheckoutTotals<'a>,
    ) -> Result<Self, ReceiptError> {
        let mut lines = SmallVec::with_capacity(cart.len());

        for line in cart.iter() {
            lines.push(ReceiptLine {
                name: line.name().to_string(),
                category: line.category().to_string(),
                unit_price: *line.price(),
                quantity: line.quantity(),
                line_total: line.total()?,
                discount: catalog
                    .product(line.product())
                    .and_then(|product| product.discount),
            });
        }

        Ok(Self { lines, totals })
    }

    /// Printed lines, in cart order
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Totals the receipt summarises
    pub fn totals(&self) -> &CheckoutTotals<'a> {
        &self.totals
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "Category",
            "Unit Price",
            "Qty",
            "Line Total",
            "Discount",
        ]);

        let mut color_ops: SmallVec<[(usize, usize, Color); 16]> = smallvec![];

        for (idx, line) in self.lines.iter().enumerate() {
            let row = idx + 1; // header is row 0

            let discount = line
                .discount
                .map(|percent| format!("-{}%", percent_points(percent)))
                .unwrap_or_default();

            if !discount.is_empty() {
                color_ops.push((row, 6, Color::FG_GREEN));
            }

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                line.category.clone(),
                format!("{}", line.unit_price),
                line.quantity.to_string(),
                format!("{}", line.line_total),
                discount,
            ]);

            color_ops.push((row, 2, color_dark_grey()));
        }

        write_receipt_table(&mut out, builder, color_ops)?;

        write_receipt_summary(&mut out, &self.totals)
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: SmallVec<[(usize, usize, Color); 16]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..7), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    totals: &CheckoutTotals<'_>,
) -> Result<(), ReceiptError> {
    let coupon_label = match totals.coupon() {
        Some(code) => format!(" Coupon ({code}):"),
        None => " Coupon:".to_string(),
    };

    let rows: [(String, String); 6] = [
        (" Subtotal:".to_string(), format!("{}  ", totals.subtotal())),
        (
            " Product discount:".to_string(),
            format!("-{}  ", totals.product_discount()),
        ),
        (coupon_label, format!("-{}  ", totals.coupon_discount())),
        (
            format!(" Delivery ({} items):", totals.item_count()),
            format!("{}  ", totals.delivery_fee()),
        ),
        (
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", totals.grand_total()),
        ),
        (" Savings:".to_string(), format!("{}  ", totals.savings()?)),
    ];

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
