use chrono::Utc;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};

use crate::attendance::summary::{format_minutes, summarize};
use crate::model::attendance::AttendanceRecord;
use crate::model::report::SaveRequest;

const HEADERS: [&str; 8] = [
    "ID",
    "Nombre",
    "Fecha",
    "Entrada",
    "Salida",
    "Estado",
    "Tardanza (min)",
    "Horas extra (min)",
];

/// Renders the batch about to be saved as a spreadsheet, in memory.
pub fn build_report(records: &[AttendanceRecord], request: &SaveRequest) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);
    let label_format = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Asistencias")?;

        sheet.write_string_with_format(0, 0, "Reporte de asistencias", &title_format)?;
        sheet.write_string(1, 0, format!("Registrado por: {}", request.registrado_por))?;
        sheet.write_string(1, 3, format!("Área: {}", request.area))?;
        sheet.write_string(2, 0, format!("Generado: {}", Utc::now().format("%Y-%m-%d %H:%M UTC")))?;

        let header_row = 4;
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(header_row, col as u16, *header, &header_format)?;
        }

        sheet.set_column_width(0, 10)?;
        sheet.set_column_width(1, 30)?;
        sheet.set_column_width(2, 12)?;
        sheet.set_column_width(3, 10)?;
        sheet.set_column_width(4, 10)?;
        sheet.set_column_width(5, 14)?;
        sheet.set_column_width(6, 14)?;
        sheet.set_column_width(7, 16)?;

        for (idx, r) in records.iter().enumerate() {
            let row = header_row + 1 + idx as u32;
            sheet.write_string(row, 0, r.employee_id.as_str())?;
            sheet.write_string(row, 1, r.name.as_str())?;
            sheet.write_string(row, 2, r.date.format("%Y-%m-%d").to_string())?;
            sheet.write_string(row, 3, r.clock_in.as_deref().unwrap_or("-"))?;
            sheet.write_string(row, 4, r.clock_out.as_deref().unwrap_or("-"))?;
            sheet.write_string(row, 5, r.status().label())?;
            sheet.write_number(row, 6, r.tardiness_minutes() as f64)?;
            sheet.write_number(row, 7, r.overtime_minutes() as f64)?;
        }

        let summary = summarize(records, None);
        let mut row = header_row + 2 + records.len() as u32;
        let lines = [
            ("Puntuales", summary.on_time_count.to_string()),
            ("Tardanzas", summary.late_count.to_string()),
            ("No registrados", summary.absent_count.to_string()),
            ("Tardanza total", format_minutes(summary.total_tardiness_minutes)),
            ("Minutos a favor", format_minutes(summary.total_owed_minutes)),
            ("Horas extra", format_minutes(summary.total_overtime_minutes)),
            ("Balance neto", format_minutes(summary.net_owed_or_extra_minutes)),
        ];
        for (label, value) in lines {
            sheet.write_string_with_format(row, 0, label, &label_format)?;
            sheet.write_string(row, 1, value)?;
            row += 1;
        }

        sheet.set_freeze_panes(header_row + 1, 0)?;
    }

    workbook.save_to_buffer()
}
