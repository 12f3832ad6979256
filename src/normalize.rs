//! Record normalization.
//!
//! One extracted object becomes zero or more output records: one per
//! `route-set` member, one per CIDR covering an address range, or exactly
//! one for an object that already names a CIDR. Every emitted
//! `address_prefix` has been checked to canonicalize.

use crate::address::{range_to_cidrs, sanitize, split_range, CanonicalAddress};
use crate::error::AddressParseError;
use crate::extract::{AddressField, ExtractedRecord, RecordFields};

/// Number of columns in an output row.
pub const COLUMN_COUNT: usize = 8;

/// Canonical output record, one row of the TSV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub address_prefix: String,
    pub netname: String,
    pub description: String,
    pub country: String,
    pub maintained_by: String,
    pub created: String,
    pub last_modified: String,
    pub source: String,
}

impl NormalizedRecord {
    /// Build a record for `address_prefix` sharing the object's other fields.
    pub fn new(address_prefix: String, fields: &RecordFields) -> Self {
        Self {
            address_prefix,
            netname: fields.netname.clone(),
            description: fields.description.clone(),
            country: fields.country.clone(),
            maintained_by: fields.maintained_by.clone(),
            created: fields.created.clone(),
            last_modified: fields.last_modified.clone(),
            source: fields.source.clone(),
        }
    }

    /// Columns in output order.
    pub fn columns(&self) -> [&str; COLUMN_COUNT] {
        [
            self.address_prefix.as_str(),
            self.netname.as_str(),
            self.description.as_str(),
            self.country.as_str(),
            self.maintained_by.as_str(),
            self.created.as_str(),
            self.last_modified.as_str(),
            self.source.as_str(),
        ]
    }
}

/// Normalize one extracted object.
///
/// Each entry is either a record or the reason one address was dropped;
/// a failing member does not affect its siblings.
pub fn normalize(record: &ExtractedRecord) -> Vec<Result<NormalizedRecord, AddressParseError>> {
    match &record.address {
        AddressField::Members(members) => members
            .iter()
            .map(|member| validated(sanitize(member), &record.fields))
            .collect(),
        AddressField::Single(value) => match split_range(value) {
            Some((start, end)) => match range_to_cidrs(start, end) {
                Ok(cidrs) => cidrs
                    .into_iter()
                    .map(|cidr| Ok(NormalizedRecord::new(cidr.to_string(), &record.fields)))
                    .collect(),
                Err(e) => vec![Err(e)],
            },
            None => vec![validated(sanitize(value), &record.fields)],
        },
    }
}

fn validated(prefix: String, fields: &RecordFields) -> Result<NormalizedRecord, AddressParseError> {
    CanonicalAddress::parse(&prefix)?;
    Ok(NormalizedRecord::new(prefix, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> RecordFields {
        RecordFields {
            netname: "NET".into(),
            description: "desc".into(),
            country: "US".into(),
            maintained_by: "MNT".into(),
            created: "c".into(),
            last_modified: "m".into(),
            source: "radb".into(),
        }
    }

    fn prefixes(address: AddressField) -> Vec<String> {
        normalize(&ExtractedRecord {
            address,
            fields: fields(),
        })
        .into_iter()
        .filter_map(|r| r.ok())
        .map(|r| r.address_prefix)
        .collect()
    }

    #[test]
    fn test_members_one_record_each() {
        let out = normalize(&ExtractedRecord {
            address: AddressField::Members(vec!["10.0.0.0/24".into(), "10.0.1.0/24".into()]),
            fields: fields(),
        });
        assert_eq!(out.len(), 2);
        let first = out[0].as_ref().unwrap();
        let second = out[1].as_ref().unwrap();
        assert_eq!(first.address_prefix, "10.0.0.0/24");
        assert_eq!(second.address_prefix, "10.0.1.0/24");
        assert_eq!(first.netname, second.netname);
        assert_eq!(second.columns()[7], "radb");
    }

    #[test]
    fn test_members_are_sanitized_and_validated() {
        let out = normalize(&ExtractedRecord {
            address: AddressField::Members(vec![
                "{10.0.0.0/8}".into(),
                "10.1.0.0/16^+".into(),
                "RS-NESTED".into(),
            ]),
            fields: fields(),
        });
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().unwrap().address_prefix, "10.0.0.0/8");
        assert_eq!(out[1].as_ref().unwrap().address_prefix, "10.1.0.0/16");
        assert!(out[2].is_err());
    }

    #[test]
    fn test_range_expands_to_minimal_cover() {
        assert_eq!(
            prefixes(AddressField::Single("10.0.0.1-10.0.0.6".into())),
            vec!["10.0.0.1/32", "10.0.0.2/31", "10.0.0.4/31", "10.0.0.6/32"]
        );
        assert_eq!(
            prefixes(AddressField::Single("10.0.0.0 - 10.0.0.255".into())),
            vec!["10.0.0.0/24"]
        );
    }

    #[test]
    fn test_ipv6_range_expands() {
        assert_eq!(
            prefixes(AddressField::Single(
                "2001:db8::-2001:db8:0:ffff:ffff:ffff:ffff:ffff".into()
            )),
            vec!["2001:db8::/48"]
        );
    }

    #[test]
    fn test_cidr_passes_through() {
        assert_eq!(
            prefixes(AddressField::Single("2001:db8::/32".into())),
            vec!["2001:db8::/32"]
        );
        assert_eq!(
            prefixes(AddressField::Single("192.0.2.0/24".into())),
            vec!["192.0.2.0/24"]
        );
    }

    #[test]
    fn test_unparseable_address_is_dropped() {
        let out = normalize(&ExtractedRecord {
            address: AddressField::Single("not-an-address".into()),
            fields: fields(),
        });
        assert_eq!(out.len(), 1);
        assert!(out[0].is_err());

        let out = normalize(&ExtractedRecord {
            address: AddressField::Single("10.0.0.9 - 10.0.0.1".into()),
            fields: fields(),
        });
        assert!(matches!(out[0], Err(AddressParseError::EmptyRange(_))));
    }

    #[test]
    fn test_fields_copied_to_every_record() {
        let out = normalize(&ExtractedRecord {
            address: AddressField::Single("10.0.0.1-10.0.0.2".into()),
            fields: fields(),
        });
        assert_eq!(out.len(), 2);
        for record in out {
            let record = record.unwrap();
            assert_eq!(record.description, "desc");
            assert_eq!(record.maintained_by, "MNT");
        }
    }
}
