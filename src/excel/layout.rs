use anyhow::{Context, Result};
use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::excel::{ColumnSpan, MergedRange, RowHeight, SheetLayout};
use crate::utils::helpers::parse_range_ref;

/// Read column widths, row heights, and merged ranges for every sheet in an
/// xlsx container. calamine does not surface worksheet layout, so this goes
/// straight at the OOXML parts: workbook.xml names the sheets, the workbook
/// rels map them to their worksheet XML, and each worksheet XML carries
/// `<col>`, `<row>`, and `<mergeCell>` entries.
pub fn read_sheet_layouts(path: &Path) -> Result<HashMap<String, SheetLayout>> {
    let file = File::open(path)
        .with_context(|| format!("Unable to open workbook: {}", path.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("Unable to read xlsx container: {}", path.display()))?;

    let workbook_xml = zip_entry_to_string(&mut zip, "xl/workbook.xml")?;
    let rels_xml = zip_entry_to_string(&mut zip, "xl/_rels/workbook.xml.rels")?;

    let sheet_rids = parse_workbook_sheet_rids(&workbook_xml)?;
    let rel_targets = parse_relationship_targets(&rels_xml)?;

    let mut layouts = HashMap::new();
    for (name, rid) in sheet_rids {
        let Some(target) = rel_targets.get(&rid) else {
            continue;
        };
        let sheet_path = join_workbook_part(target);
        let sheet_xml = zip_entry_to_string(&mut zip, &sheet_path)?;
        let layout = parse_sheet_layout(&sheet_xml)?;
        if !layout.is_empty() {
            layouts.insert(name, layout);
        }
    }

    Ok(layouts)
}

fn zip_entry_to_string(zip: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = zip
        .by_name(name)
        .with_context(|| format!("Missing xlsx part: {name}"))?;
    let mut out = String::new();
    entry
        .read_to_string(&mut out)
        .with_context(|| format!("Unable to read xlsx part: {name}"))?;
    Ok(out)
}

/// Relationship targets are relative to xl/; absolute targets carry a
/// leading slash.
fn join_workbook_part(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Extract (sheet name, relationship id) pairs from workbook.xml, in
/// workbook order.
fn parse_workbook_sheet_rids(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut out = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"sheet" {
                    let name = attr_value(&e, b"name");
                    let rid = attr_value(&e, b"r:id");
                    if let (Some(name), Some(rid)) = (name, rid) {
                        out.push((name, rid));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("Unable to parse workbook.xml: {e}"),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

/// Extract relationship id -> target mappings from a .rels part.
fn parse_relationship_targets(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut out = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"Relationship" {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    if let (Some(id), Some(target)) = (id, target) {
                        out.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("Unable to parse relationships: {e}"),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

/// Parse one worksheet XML part into its layout metadata. Only columns and
/// rows flagged with customWidth/customHeight are captured; default-sized
/// ones leave the corresponding field absent.
fn parse_sheet_layout(xml: &str) -> Result<SheetLayout> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();

    let mut column_widths: Vec<ColumnSpan> = Vec::new();
    let mut row_heights: Vec<RowHeight> = Vec::new();
    let mut merged_ranges: Vec<MergedRange> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"col" if attr_value(&e, b"customWidth").as_deref() == Some("1") => {
                    let min = attr_value(&e, b"min").and_then(|v| v.parse::<u32>().ok());
                    let max = attr_value(&e, b"max").and_then(|v| v.parse::<u32>().ok());
                    let width = attr_value(&e, b"width").and_then(|v| v.parse::<f64>().ok());
                    if let (Some(min), Some(max), Some(width)) = (min, max, width) {
                        if min >= 1 && max >= min {
                            column_widths.push(ColumnSpan {
                                first_col: (min - 1) as u16,
                                last_col: (max - 1) as u16,
                                width,
                            });
                        }
                    }
                }
                b"row" if attr_value(&e, b"customHeight").as_deref() == Some("1") => {
                    let row = attr_value(&e, b"r").and_then(|v| v.parse::<u32>().ok());
                    let height = attr_value(&e, b"ht").and_then(|v| v.parse::<f64>().ok());
                    if let (Some(row), Some(height)) = (row, height) {
                        if row >= 1 {
                            row_heights.push(RowHeight {
                                row: row - 1,
                                height,
                            });
                        }
                    }
                }
                b"mergeCell" => {
                    if let Some(range) = attr_value(&e, b"ref").as_deref().and_then(parse_range_ref)
                    {
                        let ((first_row, first_col), (last_row, last_col)) = range;
                        merged_ranges.push(MergedRange {
                            first_row,
                            first_col: first_col as u16,
                            last_row,
                            last_col: last_col as u16,
                        });
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("Unable to parse worksheet XML: {e}"),
            _ => {}
        }
        buf.clear();
    }

    Ok(SheetLayout {
        column_widths: (!column_widths.is_empty()).then_some(column_widths),
        row_heights: (!row_heights.is_empty()).then_some(row_heights),
        merged_ranges: (!merged_ranges.is_empty()).then_some(merged_ranges),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_layout_parses_cols_rows_and_merges() {
        let xml = r#"<worksheet>
            <cols>
                <col min="1" max="2" width="18.5" customWidth="1"/>
                <col min="3" max="3" width="8.43"/>
            </cols>
            <sheetData>
                <row r="1" ht="30" customHeight="1"><c r="A1" t="s"><v>0</v></c></row>
                <row r="2"><c r="A2"><v>1</v></c></row>
            </sheetData>
            <mergeCells count="1"><mergeCell ref="A1:B1"/></mergeCells>
        </worksheet>"#;

        let layout = parse_sheet_layout(xml).unwrap();

        assert_eq!(
            layout.column_widths,
            Some(vec![ColumnSpan {
                first_col: 0,
                last_col: 1,
                width: 18.5,
            }])
        );
        assert_eq!(
            layout.row_heights,
            Some(vec![RowHeight {
                row: 0,
                height: 30.0,
            }])
        );
        assert_eq!(
            layout.merged_ranges,
            Some(vec![MergedRange {
                first_row: 0,
                first_col: 0,
                last_row: 0,
                last_col: 1,
            }])
        );
    }

    #[test]
    fn sheet_layout_fields_absent_when_undefined() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
        </sheetData></worksheet>"#;

        let layout = parse_sheet_layout(xml).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn workbook_sheet_order_is_preserved() {
        let xml = r#"<workbook><sheets>
            <sheet name=" Ana Sayfa depo modülü" sheetId="1" r:id="rId1"/>
            <sheet name="Mali Tablo Modülü " sheetId="2" r:id="rId2"/>
        </sheets></workbook>"#;

        let sheets = parse_workbook_sheet_rids(xml).unwrap();
        assert_eq!(
            sheets,
            vec![
                (" Ana Sayfa depo modülü".to_string(), "rId1".to_string()),
                ("Mali Tablo Modülü ".to_string(), "rId2".to_string()),
            ]
        );
    }

    #[test]
    fn relationship_targets_resolve() {
        let xml = r#"<Relationships>
            <Relationship Id="rId1" Type="x" Target="worksheets/sheet1.xml"/>
            <Relationship Id="rId2" Type="x" Target="/xl/worksheets/sheet2.xml"/>
        </Relationships>"#;

        let targets = parse_relationship_targets(xml).unwrap();
        assert_eq!(
            join_workbook_part(&targets["rId1"]),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            join_workbook_part(&targets["rId2"]),
            "xl/worksheets/sheet2.xml"
        );
    }
}
