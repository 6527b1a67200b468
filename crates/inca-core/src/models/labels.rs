//! Label table: the caption phrasings that announce each field.

use serde::{Deserialize, Serialize};

use super::fields::CanonicalField;

/// Label variants for one field, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub field: CanonicalField,
    /// Case-insensitive regular expressions.
    pub patterns: Vec<String>,
}

impl LabelSpec {
    pub fn new(field: CanonicalField, patterns: &[&str]) -> Self {
        Self {
            field,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Field → label patterns, passed explicitly into the extractor so layouts
/// can ship their own variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    specs: Vec<LabelSpec>,
}

impl LabelTable {
    pub fn new(specs: Vec<LabelSpec>) -> Self {
        Self { specs }
    }

    /// An empty table; every field resolves to null.
    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    pub fn specs(&self) -> &[LabelSpec] {
        &self.specs
    }

    /// Patterns for a field, concatenated across specs naming it.
    pub fn patterns_for(&self, field: CanonicalField) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(move |s| s.field == field)
            .flat_map(|s| s.patterns.iter().map(String::as_str))
    }

    /// Replace the patterns of a field.
    pub fn set(&mut self, field: CanonicalField, patterns: &[&str]) {
        self.specs.retain(|s| s.field != field);
        self.specs.push(LabelSpec::new(field, patterns));
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        use CanonicalField::*;

        Self::new(vec![
            LabelSpec::new(
                SellerName,
                &[
                    r"seller'?s?\s+name\s*:?",
                    r"seller\s*\(.*?also called.*?\)",
                    r"^seller\s*:",
                    r"\bseller\s*:",
                    r"se[il]ler\s+name",
                ],
            ),
            LabelSpec::new(
                SellerAddress,
                &[
                    r"seller'?s?\s+address\s*:?",
                    r"seller\s+address\s*:?",
                    r"\bseller\s*:",
                ],
            ),
            LabelSpec::new(SellerCity, &[r"seller'?s?\s+city\s*:?", r"seller\s+city\s*:?"]),
            LabelSpec::new(SellerState, &[r"seller'?s?\s+state\s*:?", r"seller\s+state\s*:?"]),
            LabelSpec::new(
                SellerZipCode,
                &[
                    r"seller'?s?\s+zip\s*:?",
                    r"seller\s+zip\s*:?",
                    r"seller'?s?\s+zip\s+code\s*:?",
                ],
            ),
            LabelSpec::new(
                SellerPhoneNumber,
                &[
                    r"seller'?s?\s+phone\s*:?",
                    r"seller\s+phone\s*:?",
                    r"seller'?s?\s+phone\s+number\s*:?",
                ],
            ),
            LabelSpec::new(
                BuyerName,
                &[
                    r"buyer\s+1'?s?\s+name\s*:?",
                    r"buyer'?s?\s+name\s*:?",
                    r"buyer\s*\(.*?also called.*?\)",
                    r"^buyer\s*:",
                ],
            ),
            LabelSpec::new(
                CoBuyerName,
                &[
                    r"buyer\s+2'?s?\s+name\s*:?",
                    r"co-?buyer'?s?\s+name\s*:?",
                    r"co-?buyer\s*:?",
                ],
            ),
            LabelSpec::new(
                BuyerAddress,
                &[
                    r"buyer\s+1'?s?\s+address\s*:?",
                    r"buyer'?s?\s+address\s*:?",
                    r"mailing\s+address\s*:",
                    r"street\s+address\s*:",
                ],
            ),
            LabelSpec::new(
                BuyerPhoneNumber,
                &[
                    r"buyer\s+1'?s?\s+phone\s*:?",
                    r"buyer'?s?\s+phone\s*:?",
                    r"phone\s+number",
                    r"phone\s*:",
                    r"phone\s+no",
                ],
            ),
            LabelSpec::new(
                CoBuyerAddress,
                &[
                    r"buyer\s+2'?s?\s+address\s*:?",
                    r"co-?buyer'?s?\s+address\s*:?",
                    r"co-?buyer\s+mailing\s+address\s*:?",
                ],
            ),
            LabelSpec::new(
                CoBuyerPhoneNumber,
                &[
                    r"buyer\s+2'?s?\s+phone\s*:?",
                    r"co-?buyer'?s?\s+phone\s*:?",
                    r"co-?buyer\s+phone\s+number\s*:?",
                ],
            ),
            LabelSpec::new(
                StreetAddress,
                &[r"mailing\s+address\s*:", r"street\s+address\s*:", r"address\s*:"],
            ),
            LabelSpec::new(PhoneNumber, &[r"phone\s+number", r"phone\s*:", r"phone\s+no"]),
            LabelSpec::new(Quantity, &[r"quantity\s*:", r"qty\s*:", r"qty\.\s*:"]),
            LabelSpec::new(
                ItemsPurchased,
                &[
                    r"items?\s*:",
                    r"description\s+of\s+goods",
                    r"description\s*:",
                    r"goods\s+or\s+services",
                ],
            ),
            LabelSpec::new(
                MakeOrModel,
                &[r"make\s+or\s+model", r"make/?model", r"make\s*:", r"model\s*:"],
            ),
            LabelSpec::new(AmountFinanced, &[r"amount\s+financed", r"amount\s+of\s+credit"]),
            LabelSpec::new(FinanceCharge, &[r"finance\s+charge"]),
            LabelSpec::new(
                Apr,
                &[
                    r"annual\s+percentage\s+rate",
                    r"\bapr\s*:",
                    r"annual\s+percentage",
                ],
            ),
            LabelSpec::new(TotalOfPayments, &[r"total\s+of\s+payments", r"total\s+payments"]),
            LabelSpec::new(
                NumberOfPayments,
                &[
                    r"number\s+of\s+payments",
                    r"number\s+of\s+installment\s+payments",
                    r"installment\s+payments",
                ],
            ),
            LabelSpec::new(
                AmountOfPayments,
                &[
                    r"amount\s+of\s+payments\s*:",
                    r"amount\s+of\s+the\s+installment\s+payment\s*:",
                    r"payment\s+amount\s*:",
                    r"installment\s+payment\s+amount\s*:",
                    r"amount\s+of\s+each\s+payment\s*:",
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_every_field() {
        let table = LabelTable::default();
        for field in CanonicalField::ALL {
            assert!(
                table.patterns_for(field).next().is_some(),
                "no labels for {}",
                field
            );
        }
    }

    #[test]
    fn test_set_replaces_patterns() {
        let mut table = LabelTable::default();
        table.set(CanonicalField::Apr, &[r"rate\s*:"]);
        let patterns: Vec<&str> = table.patterns_for(CanonicalField::Apr).collect();
        assert_eq!(patterns, vec![r"rate\s*:"]);
    }

    #[test]
    fn test_table_json_rejects_unknown_field() {
        let json = r#"[{"field": "seller_nickname", "patterns": ["nick:"]}]"#;
        let err = serde_json::from_str::<LabelTable>(json).unwrap_err();
        assert!(err.to_string().contains("seller_nickname"));
    }
}
