//! Fund company ranking parser.

use scraper::{Html, Selector};

use crate::types::CompanyScale;

/// Parser for the fund company ranking table (`#gspmTbl`)
pub struct CompanyParser;

impl CompanyParser {
    /// Parse company name and managed scale from each table row.
    /// Rows whose scale cannot be read are skipped.
    pub fn parse(html: &str) -> Vec<CompanyScale> {
        let document = Html::parse_document(html);
        let (Ok(tr_selector), Ok(td_selector), Ok(name_selector), Ok(scale_selector)) = (
            Selector::parse("#gspmTbl tbody tr"),
            Selector::parse("td"),
            Selector::parse("a"),
            Selector::parse("p"),
        ) else {
            return Vec::new();
        };

        let mut companies = Vec::new();

        for row in document.select(&tr_selector) {
            let cells: Vec<_> = row.select(&td_selector).collect();
            if cells.len() < 6 {
                continue;
            }

            let Some(name) = cells[1].select(&name_selector).next() else {
                continue;
            };
            let name = name.text().collect::<String>().trim().to_string();

            let Some(scale) = cells[5]
                .select(&scale_selector)
                .next()
                .and_then(|p| Self::parse_scale(&p.text().collect::<String>()))
            else {
                continue;
            };

            companies.push(CompanyScale { name, scale });
        }

        companies
    }

    /// "12,345.67亿" -> 12345.67
    fn parse_scale(text: &str) -> Option<f64> {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != '亿' && *c != ',' && !c.is_whitespace())
            .collect();
        cleaned.parse().ok()
    }
}

/// Companies with scale strictly above `min_scale`, in page order
pub fn large_companies(companies: &[CompanyScale], min_scale: f64) -> Vec<&CompanyScale> {
    companies.iter().filter(|c| c.scale > min_scale).collect()
}
