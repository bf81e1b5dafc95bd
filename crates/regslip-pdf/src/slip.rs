// SPDX-License-Identifier: Apache-2.0

use base64::Engine as _;
use chrono::{DateTime, Utc};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rect, Rgb,
};
use regslip_model::Registrant;
use std::fmt::{Display, Formatter};

use crate::org::OrgProfile;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const PT_TO_MM: f32 = 0.352_778;
// Average Helvetica glyph advance as a fraction of the font size; close
// enough for centering and wrapping a fixed template.
const GLYPH_ADVANCE_EM: f32 = 0.5;
const IMAGE_DPI: f32 = 300.0;

const GOLD: (u8, u8, u8) = (184, 134, 11);
const NAVY: (u8, u8, u8) = (25, 45, 85);
const TEXT_DARK: (u8, u8, u8) = (35, 35, 35);
const TEXT_LIGHT: (u8, u8, u8) = (80, 80, 80);

#[derive(Debug)]
#[non_exhaustive]
pub enum RenderError {
    Pdf(String),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf(msg) => write!(f, "pdf render failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// `en-US` long date: `June 1, 2025`.
#[must_use]
pub fn format_long_date(dt: DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

/// Download filename: full name with whitespace runs collapsed to
/// underscores, suffixed with the organization acronym.
#[must_use]
pub fn slip_filename(full_name: &str, acronym: &str) -> String {
    let underscored = full_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{underscored}_{acronym}_Acknowledgment_Slip.pdf")
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Lays out the acknowledgment slip for one registrant and returns the PDF
/// bytes. Logo and registrant photo failures are swallowed: the slip
/// renders without the affected image.
pub fn render_slip(
    registrant: &Registrant,
    org: &OrgProfile,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(&org.heading, Mm(PAGE_W), Mm(PAGE_H), "slip");
    let layer = doc.get_page(page).get_layer(layer);
    let fonts = Fonts {
        regular: builtin(&doc, BuiltinFont::Helvetica)?,
        bold: builtin(&doc, BuiltinFont::HelveticaBold)?,
        italic: builtin(&doc, BuiltinFont::HelveticaOblique)?,
    };

    draw_frame(&layer);
    let mut y = 12.0_f32;

    if let Some(logo) = &org.logo_png {
        // Failure is tolerated: the header simply has no logo.
        let _ = place_image(&layer, logo, PAGE_W / 2.0 - 12.0, y, 24.0, 24.0);
    }
    y += 28.0;

    text_centered(&layer, &fonts.bold, 24.0, NAVY, &org.name, y);
    y += 8.0;
    text_centered(&layer, &fonts.italic, 11.0, GOLD, &org.slogan, y);
    y += 12.0;

    stroke_line(
        &layer,
        GOLD,
        1.0,
        MARGIN + 15.0,
        y,
        PAGE_W - MARGIN - 15.0,
        y,
    );
    y += 8.0;
    text_centered(&layer, &fonts.bold, 14.0, NAVY, &org.heading, y);
    y += 10.0;

    // Two-column region: photo frame left, certification prose right.
    let left_col_x = MARGIN + 3.0;
    let right_box_x = PAGE_W / 2.0;
    let right_box_w = (PAGE_W - 2.0 * MARGIN - 10.0) / 2.0 + 5.0;

    if let Some(image) = &registrant.image {
        if let Some(bytes) = decode_data_url(image.as_str()) {
            if place_image(&layer, &bytes, left_col_x + 3.0, y + 1.0, 43.0, 58.0) {
                stroke_rect(&layer, GOLD, 1.5, left_col_x + 2.0, y, 45.0, 60.0);
            }
        }
    }

    let mut line_y = y + 5.0;
    for paragraph in org.certification.split("\n\n") {
        for line in wrap_text(paragraph, 10.0, right_box_w - 4.0) {
            text_at(
                &layer,
                &fonts.regular,
                10.0,
                TEXT_DARK,
                &line,
                right_box_x + 2.0,
                line_y,
            );
            line_y += 10.0 * PT_TO_MM * 1.35;
        }
        line_y += 10.0 * PT_TO_MM * 1.35;
    }
    y += 65.0;

    text_at(
        &layer,
        &fonts.bold,
        10.0,
        NAVY,
        "REGISTRANT INFORMATION",
        MARGIN + 2.0,
        y,
    );
    y += 7.0;

    let fields = [
        ("Full Name:", registrant.full_name.as_str().to_string()),
        ("Registration ID:", registrant.id_number.as_str().to_string()),
        ("Email Address:", registrant.email.as_str().to_string()),
        ("Phone Number:", registrant.phone_number.as_str().to_string()),
        ("Gender:", registrant.gender.label().to_string()),
        ("Submit Date:", format_long_date(registrant.created_at)),
    ];
    for (index, (label, value)) in fields.iter().enumerate() {
        let col_x = if index % 2 == 0 {
            MARGIN + 2.0
        } else {
            PAGE_W / 2.0 + 5.0
        };
        #[allow(clippy::cast_precision_loss)]
        let row_y = y + (index / 2) as f32 * 8.0;
        text_at(&layer, &fonts.bold, 9.0, TEXT_LIGHT, label, col_x, row_y);
        text_at(
            &layer,
            &fonts.regular,
            9.0,
            TEXT_DARK,
            value,
            col_x + 35.0,
            row_y,
        );
    }
    y += 28.0;

    text_at(
        &layer,
        &fonts.bold,
        10.0,
        NAVY,
        "AUTHORIZED EXECUTION & CERTIFICATION",
        MARGIN + 2.0,
        y,
    );
    y += 10.0;

    let sign_y = y + 12.0;
    let sign_left = MARGIN + 5.0;
    let sign_right = PAGE_W / 2.0 + 10.0;
    stroke_line(&layer, TEXT_DARK, 0.5, sign_left, sign_y, sign_left + 40.0, sign_y);
    text_at(
        &layer,
        &fonts.regular,
        8.0,
        TEXT_LIGHT,
        "Authorized Officer Signature",
        sign_left + 2.0,
        sign_y + 4.0,
    );
    stroke_line(&layer, TEXT_DARK, 0.5, sign_right, sign_y, sign_right + 40.0, sign_y);
    text_at(
        &layer,
        &fonts.regular,
        8.0,
        TEXT_LIGHT,
        "Date",
        sign_right + 15.0,
        sign_y + 4.0,
    );

    let mut footer_y = PAGE_H - 18.0;
    stroke_line(&layer, GOLD, 0.8, MARGIN, footer_y, PAGE_W - MARGIN, footer_y);
    footer_y += 5.0;
    text_centered(&layer, &fonts.bold, 9.0, NAVY, &org.footer_line, footer_y);
    footer_y += 4.0;
    let generated = format!(
        "{} Generated: {}",
        org.footer_note,
        format_long_date(generated_at)
    );
    text_centered(&layer, &fonts.regular, 7.0, TEXT_LIGHT, &generated, footer_y);
    footer_y += 3.0;
    let doc_id = format!("Document ID: {}", registrant.roster_id.as_str());
    text_centered(&layer, &fonts.regular, 7.0, TEXT_LIGHT, &doc_id, footer_y);

    doc.save_to_bytes().map_err(|e| RenderError::Pdf(e.to_string()))
}

fn builtin(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, RenderError> {
    doc.add_builtin_font(font)
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn rgb(channels: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(channels.0) / 255.0,
        f32::from(channels.1) / 255.0,
        f32::from(channels.2) / 255.0,
        None,
    ))
}

/// Decorative page frame: gold top/bottom bars and side rules.
fn draw_frame(layer: &PdfLayerReference) {
    layer.set_fill_color(rgb(GOLD));
    layer.add_rect(
        Rect::new(Mm(0.0), Mm(PAGE_H - 3.0), Mm(PAGE_W), Mm(PAGE_H)).with_mode(PaintMode::Fill),
    );
    layer.add_rect(Rect::new(Mm(0.0), Mm(0.0), Mm(PAGE_W), Mm(3.0)).with_mode(PaintMode::Fill));
    stroke_line(layer, GOLD, 0.5, MARGIN - 2.0, 8.0, MARGIN - 2.0, PAGE_H - 8.0);
    stroke_line(
        layer,
        GOLD,
        0.5,
        PAGE_W - MARGIN + 2.0,
        8.0,
        PAGE_W - MARGIN + 2.0,
        PAGE_H - 8.0,
    );
}

/// Stroke a line between two points given in top-down layout coordinates.
fn stroke_line(
    layer: &PdfLayerReference,
    color: (u8, u8, u8),
    width_mm: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(width_mm / PT_TO_MM);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(PAGE_H - y1)), false),
            (Point::new(Mm(x2), Mm(PAGE_H - y2)), false),
        ],
        is_closed: false,
    });
}

fn stroke_rect(
    layer: &PdfLayerReference,
    color: (u8, u8, u8),
    width_mm: f32,
    x: f32,
    y_top: f32,
    w: f32,
    h: f32,
) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(width_mm / PT_TO_MM);
    layer.add_rect(
        Rect::new(Mm(x), Mm(PAGE_H - y_top - h), Mm(x + w), Mm(PAGE_H - y_top))
            .with_mode(PaintMode::Stroke),
    );
}

fn text_at(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    size_pt: f32,
    color: (u8, u8, u8),
    text: &str,
    x: f32,
    y_top: f32,
) {
    layer.set_fill_color(rgb(color));
    layer.use_text(text, size_pt, Mm(x), Mm(PAGE_H - y_top), font);
}

fn text_centered(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    size_pt: f32,
    color: (u8, u8, u8),
    text: &str,
    y_top: f32,
) {
    let x = (PAGE_W - text_width_mm(text, size_pt)) / 2.0;
    text_at(layer, font, size_pt, color, text, x.max(MARGIN), y_top);
}

#[allow(clippy::cast_precision_loss)]
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * GLYPH_ADVANCE_EM * PT_TO_MM
}

/// Greedy word wrap against the approximate glyph advance.
fn wrap_text(text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, size_pt) > max_width_mm && !current.is_empty() {
            lines.push(current);
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let (_, payload) = data_url.split_once("base64,")?;
    base64::engine::general_purpose::STANDARD.decode(payload).ok()
}

/// Embeds a decoded raster image scaled into the given box. Returns false
/// when the bytes do not decode; callers treat that as "no image".
fn place_image(
    layer: &PdfLayerReference,
    bytes: &[u8],
    x: f32,
    y_top: f32,
    w: f32,
    h: f32,
) -> bool {
    let Ok(decoded) = printpdf::image_crate::load_from_memory(bytes) else {
        return false;
    };
    let image = Image::from_dynamic_image(&decoded);
    let px_w = image.image.width.0;
    let px_h = image.image.height.0;
    if px_w == 0 || px_h == 0 {
        return false;
    }
    #[allow(clippy::cast_precision_loss)]
    let natural_w = px_w as f32 * 25.4 / IMAGE_DPI;
    #[allow(clippy::cast_precision_loss)]
    let natural_h = px_h as f32 * 25.4 / IMAGE_DPI;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(PAGE_H - y_top - h)),
            scale_x: Some(w / natural_w),
            scale_y: Some(h / natural_h),
            dpi: Some(IMAGE_DPI),
            ..ImageTransform::default()
        },
    );
    true
}
