use rust_xlsxwriter::Color;

/// A static column-chart descriptor attached to a sheet. The label and value
/// series are fixed literals carried by the descriptor itself, not derived
/// from the sheet data.
#[derive(Clone, Debug)]
pub struct ChartSpec {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<Color>,
    pub show_legend: bool,
    /// Zero-based worksheet row the chart (and its seeded series data) is
    /// anchored at.
    pub anchor_row: u32,
}

/// The depot status chart embedded below the merged report data.
///
/// Labels and values are the fixed sample figures from the source workbook's
/// reporting convention; they are intentionally not recomputed from the
/// merged rows.
pub fn depot_status_chart() -> ChartSpec {
    ChartSpec {
        title: "Depo Durumu".to_string(),
        labels: vec![
            "Geçen Yıldan Devir".to_string(),
            "Yıl İçinde Alınan".to_string(),
            "22(d) Bendi".to_string(),
            "Toplam".to_string(),
            "Depodan Çıkan".to_string(),
            "Depoda Kalan".to_string(),
        ],
        values: vec![200.0, 200.0, 100.0, 500.0, 400.0, 100.0],
        colors: vec![
            Color::RGB(0xFF6384),
            Color::RGB(0x36A2EB),
            Color::RGB(0xFFCE56),
            Color::RGB(0x4BC0C0),
            Color::RGB(0x9966FF),
            Color::RGB(0xFF9F40),
        ],
        show_legend: false,
        anchor_row: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depot_chart_series_is_parallel() {
        let spec = depot_status_chart();
        assert_eq!(spec.labels.len(), spec.values.len());
        assert_eq!(spec.labels.len(), spec.colors.len());
        assert!(!spec.show_legend);
        assert_eq!(spec.title, "Depo Durumu");
    }
}
