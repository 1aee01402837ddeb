use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::logo::LogoImage;
use super::service::{ReportDocument, NARRATIVE_HEADING, TABLE_COLUMNS};

// A4 в пунктах
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const LOGO_SIZE: f32 = 56.0;
const TITLE_X_WITH_LOGO: f32 = 113.0;

const TABLE_FONT_SIZE: f32 = 7.5;
const ROW_HEIGHT: f32 = 14.0;
const CELL_PADDING: f32 = 2.5;
/// Ширины колонок: Fecha, Equipo, Tienda, IMEI Malo, Estado, Procesado, Obs, Precio
const COLUMN_WIDTHS: [f32; 8] = [55.0, 92.0, 62.0, 78.0, 52.0, 45.0, 81.0, 50.0];

const HEADER_FILL: (f32, f32, f32) = (59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0);
const STRIPE_FILL: (f32, f32, f32) = (0.96, 0.96, 0.96);

/// Средняя ширина символа Helvetica в долях кегля
const AVG_CHAR_WIDTH: f32 = 0.5;

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Раскладка по страницам: курсор идёт сверху вниз
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    /// Отступ от верхнего края
    y: f32,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: MARGIN,
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.y = MARGIN;
    }

    /// Места до нижнего поля не хватает: новая страница. true, если она началась.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y + height > PAGE_HEIGHT - MARGIN {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Текст с базовой линией на `top` от верхнего края
    fn text(&mut self, x: f32, top: f32, size: f32, font: Font, gray: f32, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![gray.into(), gray.into(), gray.into()]),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("Td", vec![x.into(), (PAGE_HEIGHT - top).into()]),
            Operation::new("Tj", vec![win_ansi(text)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, rgb: (f32, f32, f32)) {
        self.current.extend([
            Operation::new("rg", vec![rgb.0.into(), rgb.1.into(), rgb.2.into()]),
            Operation::new(
                "re",
                vec![
                    x.into(),
                    (PAGE_HEIGHT - top - height).into(),
                    width.into(),
                    height.into(),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }

    fn image(&mut self, name: &str, x: f32, top: f32, width: f32, height: f32) {
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    x.into(),
                    (PAGE_HEIGHT - top - height).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

/// Отрисовать отчёт в PDF (A4, Helvetica)
pub fn render_pdf(report: &ReportDocument, logo: Option<&LogoImage>) -> anyhow::Result<Vec<u8>> {
    let mut layout = PageLayout::new();

    // Шапка
    let title_x = if let Some(logo) = logo {
        let scale = LOGO_SIZE / logo.width.max(logo.height) as f32;
        layout.image(
            "Im1",
            MARGIN,
            28.0,
            logo.width as f32 * scale,
            logo.height as f32 * scale,
        );
        TITLE_X_WITH_LOGO
    } else {
        MARGIN
    };

    layout.text(title_x, 62.0, 18.0, Font::Bold, 0.16, &report.title);
    layout.y = 80.0;
    for line in &report.metadata {
        layout.text(title_x, layout.y, 10.0, Font::Regular, 0.4, line);
        layout.y += 14.0;
    }
    if logo.is_some() {
        layout.y = layout.y.max(28.0 + LOGO_SIZE + 8.0);
    }
    layout.y += 12.0;

    if let Some(narrative) = &report.narrative {
        layout.ensure_space(30.0);
        layout.text(MARGIN, layout.y, 11.0, Font::Bold, 0.0, NARRATIVE_HEADING);
        layout.y += 15.0;
        for line in wrap_text(narrative, 9.0, CONTENT_WIDTH) {
            layout.ensure_space(12.0);
            layout.text(MARGIN, layout.y, 9.0, Font::Regular, 0.24, &line);
            layout.y += 12.0;
        }
        layout.y += 12.0;
    }

    // Таблица
    layout.ensure_space(ROW_HEIGHT * 2.0);
    draw_table_header(&mut layout);
    for (index, row) in report.rows.iter().enumerate() {
        if layout.ensure_space(ROW_HEIGHT) {
            draw_table_header(&mut layout);
        }
        if index % 2 == 1 {
            layout.fill_rect(MARGIN, layout.y, CONTENT_WIDTH, ROW_HEIGHT, STRIPE_FILL);
        }
        draw_row(&mut layout, row, Font::Regular, 0.0);
    }

    // Итоги
    layout.y += 16.0;
    layout.ensure_space(30.0);
    for line in report.totals() {
        layout.text(MARGIN, layout.y, 10.0, Font::Regular, 0.0, &line);
        layout.y += 14.0;
    }

    assemble(layout.finish(), logo)
}

fn draw_table_header(layout: &mut PageLayout) {
    layout.fill_rect(MARGIN, layout.y, CONTENT_WIDTH, ROW_HEIGHT, HEADER_FILL);
    let header = TABLE_COLUMNS.map(str::to_string);
    draw_row(layout, &header, Font::Bold, 1.0);
}

fn draw_row(layout: &mut PageLayout, cells: &[String; 8], font: Font, gray: f32) {
    let baseline = layout.y + ROW_HEIGHT - 4.0;
    let mut x = MARGIN;
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
        let text = fit_to_width(cell, TABLE_FONT_SIZE, width - 2.0 * CELL_PADDING);
        layout.text(x + CELL_PADDING, baseline, TABLE_FONT_SIZE, font, gray, &text);
        x += width;
    }
    layout.y += ROW_HEIGHT;
}

/// Собрать документ: шрифты, картинка, страницы, каталог
fn assemble(pages: Vec<Vec<Operation>>, logo: Option<&LogoImage>) -> anyhow::Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut resources = dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    };
    if let Some(logo) = logo {
        let image_id = add_jpeg(&mut doc, logo);
        resources.set("XObject", dictionary! { "Im1" => image_id });
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_jpeg(doc: &mut Document, logo: &LogoImage) -> ObjectId {
    let color_space = match logo.components {
        1 => "DeviceGray",
        4 => "DeviceCMYK",
        _ => "DeviceRGB",
    };
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => logo.width as i64,
            "Height" => logo.height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        logo.data.clone(),
    )
    // уже сжат JPEG-ом
    .with_compression(false);
    doc.add_object(stream)
}

/// Строка в WinAnsi: Latin-1 как есть, остальное -> '?'
fn win_ansi(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            0x09 | 0x0A | 0x0D => b' ',
            _ => b'?',
        })
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

fn max_chars(size: f32, width: f32) -> usize {
    (width / (size * AVG_CHAR_WIDTH)).floor().max(1.0) as usize
}

/// Обрезать текст ячейки по ширине колонки
fn fit_to_width(text: &str, size: f32, width: f32) -> String {
    let limit = max_chars(size, width);
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(2)).collect();
    cut.push_str("..");
    cut
}

/// Перенос по словам под ширину блока
fn wrap_text(text: &str, size: f32, width: f32) -> Vec<String> {
    let limit = max_chars(size, width);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > limit && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d101_warranty_report::logo::tiny_jpeg;

    fn report(rows: usize, narrative: Option<&str>) -> ReportDocument {
        ReportDocument {
            title: "Reporte General de Garantías - Tiendas K24".into(),
            metadata: vec!["Fecha de emisión: 01/06/2024".into()],
            narrative: narrative.map(str::to_string),
            rows: (0..rows)
                .map(|i| {
                    [
                        "2024-01-05".to_string(),
                        format!("iPhone 13 número {}", i),
                        "K24 Norte".to_string(),
                        "354829102938475".to_string(),
                        "Pendiente".to_string(),
                        "NO".to_string(),
                        "Observación muy larga que no cabe en la columna".to_string(),
                        "$750".to_string(),
                    ]
                })
                .collect(),
            total_records: rows,
            total_value: 750.0 * rows as f64,
            is_filtered: false,
            file_name: "reporte.pdf".into(),
        }
    }

    #[test]
    fn test_renders_single_page() {
        let bytes = render_pdf(&report(3, Some("Resumen corto.")), None).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_table_breaks_pages() {
        let bytes = render_pdf(&report(120, None), None).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 3);
    }

    #[test]
    fn test_empty_report_still_has_a_page() {
        let bytes = render_pdf(&report(0, None), None).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_logo_is_embedded() {
        let logo = LogoImage::from_jpeg(tiny_jpeg(200, 100)).unwrap();
        let bytes = render_pdf(&report(1, None), Some(&logo)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let has_image = doc.objects.values().any(|object| {
            let Object::Stream(stream) = object else {
                return false;
            };
            stream
                .dict
                .get(b"Subtype")
                .and_then(|subtype| subtype.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false)
        });
        assert!(has_image);
    }

    #[test]
    fn test_win_ansi_keeps_spanish_letters() {
        let Object::String(bytes, _) = win_ansi("Garantías ñ €") else {
            panic!("expected a string object");
        };
        assert_eq!(bytes, b"Garant\xEDas \xF1 ?");
    }

    #[test]
    fn test_fit_and_wrap() {
        assert_eq!(fit_to_width("abc", 10.0, 100.0), "abc");
        assert_eq!(fit_to_width("abcdefghijkl", 10.0, 40.0), "abcdef..");
        let lines = wrap_text("uno dos tres cuatro", 10.0, 50.0);
        assert_eq!(lines, ["uno dos", "tres", "cuatro"]);
    }
}
