// src/services/spreadsheet_service.rs

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    models::{
        inventory::{Floor, Item, ItemFields},
        log::{LogEntry, DEFAULT_MANAGER},
    },
};

pub const INVENTORY_SHEET: &str = "재고현황";
pub const HISTORY_SHEET: &str = "히스토리";
pub const EXPORT_FILE_PREFIX: &str = "ERIC_HW_List";

pub const INVENTORY_HEADERS: [&str; 8] = [
    "카테고리", "품목명", "모델/스펙", "시리얼", "수량", "위치", "담당자", "비고",
];
pub const HISTORY_HEADERS: [&str; 5] = ["시간", "유형", "담당자", "품목", "내용"];

// Excel só reconhece CSV em UTF-8 com BOM
const UTF8_BOM: &str = "\u{feff}";

/// Uma planilha: cabeçalhos e linhas de texto.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Valor da célula pelo cabeçalho. Células ausentes viram `None`.
    pub fn cell<'a>(&'a self, row: &'a [String], header: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == header)?;
        row.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub sheet_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Codificação binária das planilhas. O formato em si é de quem implementa.
pub trait SheetCodec: Send + Sync {
    fn extension(&self) -> &'static str;
    fn content_type(&self) -> &'static str;
    fn encode(&self, sheet: &Sheet) -> Result<Vec<u8>, AppError>;
    fn decode_first_sheet(&self, bytes: &[u8]) -> Result<Sheet, AppError>;
}

/// Uma planilha por arquivo CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSheetCodec;

impl SheetCodec for CsvSheetCodec {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn encode(&self, sheet: &Sheet) -> Result<Vec<u8>, AppError> {
        let mut writer = csv::Writer::from_writer(UTF8_BOM.as_bytes().to_vec());
        writer.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::SpreadsheetParse(e.to_string()))
    }

    fn decode_first_sheet(&self, bytes: &[u8]) -> Result<Sheet, AppError> {
        let bytes = bytes.strip_prefix(UTF8_BOM.as_bytes()).unwrap_or(bytes);
        // Células são lidas como estão: espaços fazem parte do valor
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| AppError::SpreadsheetParse(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AppError::SpreadsheetParse(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Sheet {
            name: INVENTORY_SHEET.to_string(),
            headers,
            rows,
        })
    }
}

// ---
// Conversões entre planilha e domínio
// ---

pub fn inventory_sheet(items: &[Item]) -> Sheet {
    let mut sheet = Sheet::new(INVENTORY_SHEET, &INVENTORY_HEADERS);
    sheet.rows = items
        .iter()
        .map(|item| {
            vec![
                item.category.clone(),
                item.name.clone(),
                item.spec.clone(),
                item.serial.clone(),
                item.total.to_string(),
                item.location.to_string(),
                item.manager.clone(),
                item.note.clone(),
            ]
        })
        .collect();
    sheet
}

pub fn history_sheet(logs: &[LogEntry]) -> Sheet {
    let mut sheet = Sheet::new(HISTORY_SHEET, &HISTORY_HEADERS);
    sheet.rows = logs
        .iter()
        .map(|log| {
            vec![
                log.created_at.to_rfc3339(),
                log.log_type.to_string(),
                log.manager.clone(),
                log.item_name.clone(),
                log.detail.clone(),
            ]
        })
        .collect();
    sheet
}

/// Quantidade de uma célula: vazia ou não numérica vale 0; negativa ou
/// fracionária invalida a planilha.
fn parse_quantity(raw: &str) -> Result<i32, AppError> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i32>() {
        if value < 0 {
            return Err(AppError::SpreadsheetParse(format!("quantidade negativa: {raw}")));
        }
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value >= 0.0 => {
            i32::try_from(value as i64)
                .map_err(|_| AppError::SpreadsheetParse(format!("quantidade grande demais: {raw}")))
        }
        Ok(value) if value.is_finite() => {
            Err(AppError::SpreadsheetParse(format!("quantidade inválida: {raw}")))
        }
        _ => Ok(0),
    }
}

// Só a célula ausente ou vazia usa o padrão; espaços são preservados
fn text_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Converte cada linha da primeira planilha em um item a inserir, aplicando
/// os valores padrão para células ausentes.
pub fn rows_to_items(sheet: &Sheet) -> Result<Vec<ItemFields>, AppError> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let location = sheet
                .cell(row, "위치")
                .and_then(|raw| raw.parse::<Floor>().ok())
                .unwrap_or_default();
            Ok(ItemFields {
                category: text_or(sheet.cell(row, "카테고리"), ""),
                name: text_or(sheet.cell(row, "품목명"), ""),
                spec: text_or(sheet.cell(row, "모델/스펙"), ""),
                serial: text_or(sheet.cell(row, "시리얼"), ""),
                total: parse_quantity(sheet.cell(row, "수량").unwrap_or_default())?,
                location,
                manager: text_or(sheet.cell(row, "담당자"), DEFAULT_MANAGER),
                note: text_or(sheet.cell(row, "비고"), ""),
            })
        })
        .collect()
}

pub fn export_file_stem(date: NaiveDate) -> String {
    format!("{}_{}", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

#[derive(Clone)]
pub struct SpreadsheetService {
    codec: Arc<dyn SheetCodec>,
}

impl Default for SpreadsheetService {
    fn default() -> Self {
        Self::new(Arc::new(CsvSheetCodec))
    }
}

impl SpreadsheetService {
    pub fn new(codec: Arc<dyn SheetCodec>) -> Self {
        Self { codec }
    }

    /// Exporta o estoque e, se houver histórico, uma segunda planilha com ele.
    pub fn export(
        &self,
        items: &[Item],
        logs: &[LogEntry],
        date: NaiveDate,
    ) -> Result<Vec<ExportFile>, AppError> {
        let stem = export_file_stem(date);
        let extension = self.codec.extension();

        let mut files = vec![ExportFile {
            file_name: format!("{stem}.{extension}"),
            sheet_name: INVENTORY_SHEET.to_string(),
            content_type: self.codec.content_type(),
            bytes: self.codec.encode(&inventory_sheet(items))?,
        }];

        if !logs.is_empty() {
            files.push(ExportFile {
                file_name: format!("{stem}_history.{extension}"),
                sheet_name: HISTORY_SHEET.to_string(),
                content_type: self.codec.content_type(),
                bytes: self.codec.encode(&history_sheet(logs))?,
            });
        }

        tracing::info!("📤 Exportação: {} itens, {} registros", items.len(), logs.len());
        Ok(files)
    }

    pub fn parse_import(&self, bytes: &[u8]) -> Result<Vec<ItemFields>, AppError> {
        let sheet = self.codec.decode_first_sheet(bytes)?;
        rows_to_items(&sheet)
    }
}
