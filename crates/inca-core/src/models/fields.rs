//! Canonical output fields of an installment credit agreement.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One of the fixed output slots the extractor always attempts to fill.
///
/// Declaration order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CanonicalField {
    SellerName,
    SellerAddress,
    SellerCity,
    SellerState,
    SellerZipCode,
    SellerPhoneNumber,
    BuyerName,
    BuyerAddress,
    BuyerPhoneNumber,
    CoBuyerName,
    CoBuyerAddress,
    CoBuyerPhoneNumber,
    /// Legacy alias of `BuyerAddress`.
    StreetAddress,
    /// Legacy alias of `BuyerPhoneNumber`.
    PhoneNumber,
    Quantity,
    ItemsPurchased,
    MakeOrModel,
    AmountFinanced,
    FinanceCharge,
    Apr,
    TotalOfPayments,
    NumberOfPayments,
    AmountOfPayments,
}

/// How a field's value is laid out, which picks the search and ranking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    /// A single OCR word (phone, amount, rate, count, city, state, ZIP).
    SingleToken,
    /// Several words on one or two lines (names, item descriptions).
    MultiWord,
    /// A street address, allowed to run longer than other multi-word values.
    AddressLike,
}

impl FieldCategory {
    /// Whether multi-word assembly runs for this category.
    pub fn assembles(&self) -> bool {
        !matches!(self, FieldCategory::SingleToken)
    }

    /// Whether ranking puts more complete (longer) candidates first.
    pub fn prefers_more_words(&self) -> bool {
        self.assembles()
    }
}

/// String shape a candidate must have to be considered for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Phone,
    Currency,
    Percentage,
    Integer,
    PersonName,
    Address,
    Locality,
    Zip,
    Text,
}

/// Which party of the agreement a field describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Seller,
    Buyer,
    CoBuyer,
    /// Purchase and financial terms.
    Agreement,
}

/// Static extraction profile of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldProfile {
    pub category: FieldCategory,
    pub kind: ValueKind,
    pub party: Party,
    /// Value sits in an indented column below its caption and ends at the
    /// next section keyword.
    pub columnar: bool,
}

impl FieldProfile {
    const fn new(category: FieldCategory, kind: ValueKind, party: Party, columnar: bool) -> Self {
        Self {
            category,
            kind,
            party,
            columnar,
        }
    }
}

impl CanonicalField {
    /// All fields in output order.
    pub const ALL: [CanonicalField; 23] = [
        CanonicalField::SellerName,
        CanonicalField::SellerAddress,
        CanonicalField::SellerCity,
        CanonicalField::SellerState,
        CanonicalField::SellerZipCode,
        CanonicalField::SellerPhoneNumber,
        CanonicalField::BuyerName,
        CanonicalField::BuyerAddress,
        CanonicalField::BuyerPhoneNumber,
        CanonicalField::CoBuyerName,
        CanonicalField::CoBuyerAddress,
        CanonicalField::CoBuyerPhoneNumber,
        CanonicalField::StreetAddress,
        CanonicalField::PhoneNumber,
        CanonicalField::Quantity,
        CanonicalField::ItemsPurchased,
        CanonicalField::MakeOrModel,
        CanonicalField::AmountFinanced,
        CanonicalField::FinanceCharge,
        CanonicalField::Apr,
        CanonicalField::TotalOfPayments,
        CanonicalField::NumberOfPayments,
        CanonicalField::AmountOfPayments,
    ];

    /// Snake-case name used in output maps and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::SellerName => "seller_name",
            CanonicalField::SellerAddress => "seller_address",
            CanonicalField::SellerCity => "seller_city",
            CanonicalField::SellerState => "seller_state",
            CanonicalField::SellerZipCode => "seller_zip_code",
            CanonicalField::SellerPhoneNumber => "seller_phone_number",
            CanonicalField::BuyerName => "buyer_name",
            CanonicalField::BuyerAddress => "buyer_address",
            CanonicalField::BuyerPhoneNumber => "buyer_phone_number",
            CanonicalField::CoBuyerName => "co_buyer_name",
            CanonicalField::CoBuyerAddress => "co_buyer_address",
            CanonicalField::CoBuyerPhoneNumber => "co_buyer_phone_number",
            CanonicalField::StreetAddress => "street_address",
            CanonicalField::PhoneNumber => "phone_number",
            CanonicalField::Quantity => "quantity",
            CanonicalField::ItemsPurchased => "items_purchased",
            CanonicalField::MakeOrModel => "make_or_model",
            CanonicalField::AmountFinanced => "amount_financed",
            CanonicalField::FinanceCharge => "finance_charge",
            CanonicalField::Apr => "apr",
            CanonicalField::TotalOfPayments => "total_of_payments",
            CanonicalField::NumberOfPayments => "number_of_payments",
            CanonicalField::AmountOfPayments => "amount_of_payments",
        }
    }

    /// Extraction profile lookup.
    pub const fn profile(&self) -> FieldProfile {
        use FieldCategory::*;
        use ValueKind::*;

        match self {
            CanonicalField::SellerName => FieldProfile::new(MultiWord, PersonName, Party::Seller, true),
            CanonicalField::SellerAddress => FieldProfile::new(AddressLike, Address, Party::Seller, false),
            CanonicalField::SellerCity => FieldProfile::new(SingleToken, Locality, Party::Seller, false),
            CanonicalField::SellerState => FieldProfile::new(SingleToken, Locality, Party::Seller, false),
            CanonicalField::SellerZipCode => FieldProfile::new(SingleToken, Zip, Party::Seller, false),
            CanonicalField::SellerPhoneNumber => FieldProfile::new(SingleToken, Phone, Party::Seller, false),
            CanonicalField::BuyerName => FieldProfile::new(MultiWord, PersonName, Party::Buyer, true),
            CanonicalField::BuyerAddress => FieldProfile::new(AddressLike, Address, Party::Buyer, true),
            CanonicalField::BuyerPhoneNumber => FieldProfile::new(SingleToken, Phone, Party::Buyer, false),
            CanonicalField::CoBuyerName => FieldProfile::new(MultiWord, PersonName, Party::CoBuyer, true),
            CanonicalField::CoBuyerAddress => FieldProfile::new(AddressLike, Address, Party::CoBuyer, true),
            CanonicalField::CoBuyerPhoneNumber => FieldProfile::new(SingleToken, Phone, Party::CoBuyer, false),
            CanonicalField::StreetAddress => FieldProfile::new(AddressLike, Address, Party::Buyer, false),
            CanonicalField::PhoneNumber => FieldProfile::new(SingleToken, Phone, Party::Buyer, false),
            CanonicalField::Quantity => FieldProfile::new(SingleToken, Integer, Party::Agreement, false),
            CanonicalField::ItemsPurchased => FieldProfile::new(MultiWord, Text, Party::Agreement, false),
            CanonicalField::MakeOrModel => FieldProfile::new(MultiWord, Text, Party::Agreement, false),
            CanonicalField::AmountFinanced => FieldProfile::new(SingleToken, Currency, Party::Agreement, false),
            CanonicalField::FinanceCharge => FieldProfile::new(SingleToken, Currency, Party::Agreement, false),
            CanonicalField::Apr => FieldProfile::new(SingleToken, Percentage, Party::Agreement, false),
            CanonicalField::TotalOfPayments => FieldProfile::new(SingleToken, Currency, Party::Agreement, false),
            CanonicalField::NumberOfPayments => FieldProfile::new(SingleToken, Integer, Party::Agreement, false),
            CanonicalField::AmountOfPayments => FieldProfile::new(SingleToken, Currency, Party::Agreement, false),
        }
    }

    pub fn category(&self) -> FieldCategory {
        self.profile().category
    }

    pub fn is_seller(&self) -> bool {
        self.profile().party == Party::Seller
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

impl TryFrom<String> for CanonicalField {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalField> for String {
    fn from(field: CanonicalField) -> Self {
        field.as_str().to_string()
    }
}

/// Extracted raw values, one slot per canonical field.
///
/// Values are pre-normalization strings: currency may still carry `$` and
/// `,`, phone numbers are unformatted, APR may carry `%`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues {
    values: BTreeMap<CanonicalField, Option<String>>,
}

impl FieldValues {
    /// All fields present and null.
    pub fn new() -> Self {
        Self {
            values: CanonicalField::ALL.iter().map(|f| (*f, None)).collect(),
        }
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).and_then(|v| v.as_deref())
    }

    pub fn set(&mut self, field: CanonicalField, value: Option<String>) {
        self.values.insert(field, value);
    }

    pub fn is_set(&self, field: CanonicalField) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }

    /// Fields and values in output order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, Option<&str>)> {
        self.values.iter().map(|(f, v)| (*f, v.as_deref()))
    }

    /// Number of fields holding a value.
    pub fn resolved_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }

    /// JSON object with every field name present, `null` when unresolved.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(f, v)| {
                    let value = v
                        .as_ref()
                        .map_or(serde_json::Value::Null, |s| serde_json::Value::String(s.clone()));
                    (f.as_str().to_string(), value)
                })
                .collect(),
        )
    }
}

impl Default for FieldValues {
    fn default() -> Self {
        Self::new()
    }
}
