//! Terminal tables for pages, facets and percentiles.

use lg_core::percentile::PercentileBand;
use lg_core::{time, Facets, LeadRow, Percentiles};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct RowLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Visitor")]
    visitor: String,
    #[tabled(rename = "Claimed By")]
    claimed_by: String,
    #[tabled(rename = "Call")]
    call_status: &'static str,
    #[tabled(rename = "Last Activity")]
    last_activity: String,
    #[tabled(rename = "Response")]
    response_time: String,
    #[tabled(rename = "Band")]
    band: &'static str,
}

impl From<&LeadRow> for RowLine {
    fn from(row: &LeadRow) -> Self {
        let lead = &row.lead;
        Self {
            id: lead.id.clone(),
            status: lead.status.as_str(),
            company: lead.company_name.clone().unwrap_or_else(|| lead.company_id.clone()),
            visitor: lead.visitor_name.clone().unwrap_or_else(|| lead.visitor_id.clone()),
            claimed_by: lead.claimed_by.clone().unwrap_or_default(),
            call_status: lead.call_status.as_str(),
            last_activity: time::to_iso(&lead.last_activity),
            response_time: lead.response_time.map(|m| format!("{m}m")).unwrap_or_default(),
            band: row.percentile.map(|p| PercentileBand::of(p).as_str()).unwrap_or(""),
        }
    }
}

pub fn rows(rows: &[LeadRow]) -> String {
    Table::new(rows.iter().map(RowLine::from))
        .with(Style::rounded())
        .to_string()
}

#[derive(Tabled)]
struct FacetLine {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// One table with every value of every facet; `only` restricts it to one field.
pub fn facets(facets: &Facets, only: Option<&str>) -> String {
    let lines: Vec<FacetLine> = facets
        .iter()
        .filter(|(name, _)| only.map_or(true, |field| field == *name))
        .flat_map(|(name, facet)| {
            facet.rows.iter().map(move |row| FacetLine {
                field: name.to_string(),
                value: row.value.to_string(),
                count: row.total,
            })
        })
        .collect();
    Table::new(lines).with(Style::rounded()).to_string()
}

pub fn percentiles(p: &Percentiles) -> String {
    p.iter()
        .map(|(checkpoint, value)| format!("p{checkpoint}={value}"))
        .collect::<Vec<_>>()
        .join("  ")
}
