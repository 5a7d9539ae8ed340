//! xlsx rendering of laid-out sheets.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use super::layout::{Cell, CellStyle, CellValue, NumberStyle, Row, Sheet};

const HEADER_FILL: u32 = 0xD3D3D3;
const SECTION_FILL: u32 = 0xE0E0E0;
const GROUP_FILL: u32 = 0xA9A9A9;
const HIGHLIGHT_FILL: u32 = 0xE6F2FF;

struct Palette {
    plain: Format,
    header: Format,
    section: Format,
    group: Format,
    highlight: Format,
    label: Format,
    note: Format,
}

impl Palette {
    fn new() -> Self {
        Self {
            plain: Format::new(),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_border(FormatBorder::Thin),
            section: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(SECTION_FILL)),
            group: Format::new()
                .set_bold()
                .set_font_size(12)
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(GROUP_FILL))
                .set_border(FormatBorder::Thin),
            highlight: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HIGHLIGHT_FILL)),
            label: Format::new().set_bold(),
            note: Format::new()
                .set_italic()
                .set_text_wrap()
                .set_align(FormatAlign::Top),
        }
    }

    fn style(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Plain => &self.plain,
            CellStyle::Header => &self.header,
            CellStyle::Section => &self.section,
            CellStyle::Group => &self.group,
            CellStyle::Highlight => &self.highlight,
            CellStyle::Label => &self.label,
            CellStyle::Note => &self.note,
        }
    }
}

/// Writes `sheets` in order and saves the workbook to `path`.
pub fn save(sheets: &[Sheet], path: &Path) -> Result<(), XlsxError> {
    let palette = Palette::new();
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet, &palette)?;
    }
    workbook.save(path)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, palette: &Palette) -> Result<(), XlsxError> {
    worksheet.set_name(sheet.name)?;
    for (column, width) in sheet.column_widths.iter().enumerate() {
        worksheet.set_column_width(column as u16, *width)?;
    }
    if sheet.freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }

    for (index, row) in sheet.rows.iter().enumerate() {
        write_row(worksheet, index as u32, row, palette)?;
    }
    Ok(())
}

fn write_row(worksheet: &mut Worksheet, row_index: u32, row: &Row, palette: &Palette) -> Result<(), XlsxError> {
    if let Some(height) = row.height {
        worksheet.set_row_height(row_index, height)?;
    }

    if let (Some(last_column), Some(first)) = (row.merge_to, row.cells.first()) {
        worksheet.merge_range(
            row_index,
            0,
            row_index,
            last_column,
            &first.as_text(),
            palette.style(first.style),
        )?;
        return Ok(());
    }

    for (column, cell) in row.cells.iter().enumerate() {
        write_cell(worksheet, row_index, column as u16, cell, palette)?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    column: u16,
    cell: &Cell,
    palette: &Palette,
) -> Result<(), XlsxError> {
    let format = palette.style(cell.style);
    match &cell.value {
        CellValue::Empty => {}
        CellValue::Text(text) => {
            worksheet.write_string_with_format(row, column, text.as_str(), format)?;
        }
        CellValue::Number(value, number_style) => {
            let pattern = match number_style {
                NumberStyle::Decimal => "0.00",
                NumberStyle::Integer => "#,##0",
            };
            let format = format.clone().set_num_format(pattern);
            worksheet.write_number_with_format(row, column, *value, &format)?;
        }
    }
    Ok(())
}
