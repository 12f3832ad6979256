//! Format-specific field extraction.
//!
//! Objects come in two format families. ARIN publishes a flat `Key: value`
//! format where network objects point at organization objects by `OrgID`;
//! every other registry publishes RPSL. [`extract_fields`] turns one object
//! into an [`ExtractedFields`] variant, and [`Extractor`] resolves ARIN
//! organization references against the [`OrgTable`] of the current file.

use ahash::AHashMap;

use crate::address::split_range;
use crate::error::{ObjectContext, ParseError};
use crate::rpsl::RpslObject;
use crate::segment::{ObjectKind, RawObject, CUSTOM_SOURCE_ATTR};
use crate::Source;

/// RPSL attributes holding the block itself, in order of preference.
const ADDRESS_ATTRIBUTES: [&str; 4] = ["inetnum", "inet6num", "route", "route6"];

/// Organization details referenced by ARIN network objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgRecord {
    pub name: String,
    pub country: String,
}

/// OrgID → organization table, scoped to one ARIN dump file.
#[derive(Debug, Default)]
pub struct OrgTable {
    orgs: AHashMap<String, OrgRecord>,
}

impl OrgTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an organization.
    pub fn insert(&mut self, org_id: String, record: OrgRecord) {
        self.orgs.insert(org_id, record);
    }

    pub fn get(&self, org_id: &str) -> Option<&OrgRecord> {
        self.orgs.get(org_id)
    }

    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }
}

/// Address value(s) of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressField {
    /// CIDR text or a `start - end` range
    Single(String),
    /// `route-set` members, one record each
    Members(Vec<String>),
}

/// Non-address columns of an output record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub netname: String,
    pub description: String,
    pub country: String,
    pub maintained_by: String,
    pub created: String,
    pub last_modified: String,
    pub source: String,
}

/// A network object ready for normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub address: AddressField,
    pub fields: RecordFields,
}

/// ARIN network object before its `OrgID` is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArinNetwork {
    /// `start-end` range taken from `NetRange`
    pub net_range: String,
    pub org_id: String,
    pub net_name: String,
    /// `NetHandle` or `V6NetHandle`
    pub handle: String,
    pub reg_date: String,
    pub updated: String,
    pub source: String,
}

/// Fields extracted from one object, by format family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedFields {
    /// ARIN organization, metadata only
    ArinOrganization { org_id: String, record: OrgRecord },
    /// ARIN network with an unresolved organization reference
    ArinNetwork(ArinNetwork),
    /// Generic RPSL network object
    Rpsl(ExtractedRecord),
}

/// Extract the fields of one object.
pub fn extract_fields(object: &RawObject, file: &str) -> Result<ExtractedFields, ParseError> {
    let text = object.text();
    let format_error = |reason: &str| ParseError::Format {
        context: object.context(file),
        reason: reason.to_string(),
    };

    match object.kind {
        ObjectKind::ArinOrganization => {
            let org_id = arin_property(&text, "OrgID").ok_or_else(|| format_error("missing OrgID"))?;
            let record = OrgRecord {
                name: arin_property(&text, "OrgName").unwrap_or_default(),
                country: arin_property(&text, "Country").unwrap_or_default(),
            };
            Ok(ExtractedFields::ArinOrganization { org_id, record })
        }
        ObjectKind::ArinNetwork => {
            let net_range = arin_property(&text, "NetRange")
                .as_deref()
                .and_then(split_range)
                .map(|(start, end)| format!("{}-{}", start, end))
                .ok_or_else(|| format_error("could not parse NetRange"))?;
            let org_id = arin_property(&text, "OrgID").ok_or_else(|| format_error("missing OrgID"))?;
            let handle = arin_property(&text, "NetHandle")
                .or_else(|| arin_property(&text, "V6NetHandle"))
                .unwrap_or_default();

            Ok(ExtractedFields::ArinNetwork(ArinNetwork {
                net_range,
                org_id,
                net_name: arin_property(&text, "NetName").unwrap_or_default(),
                handle,
                reg_date: arin_property(&text, "RegDate").unwrap_or_default(),
                updated: arin_property(&text, "Updated").unwrap_or_default(),
                source: arin_property(&text, CUSTOM_SOURCE_ATTR).unwrap_or_default(),
            }))
        }
        ObjectKind::Rpsl => {
            let rpsl = RpslObject::parse(&text).map_err(|e| format_error(&e.to_string()))?;
            extract_rpsl(&rpsl)
                .map(ExtractedFields::Rpsl)
                .ok_or_else(|| format_error("no address attribute"))
        }
    }
}

fn extract_rpsl(obj: &RpslObject) -> Option<ExtractedRecord> {
    let mut fields = RecordFields::default();

    let mut address = ADDRESS_ATTRIBUTES
        .iter()
        .find_map(|name| obj.first(name))
        .map(|value| AddressField::Single(value.to_string()));

    if obj.class() == "route-set" {
        fields.netname = obj.primary_key().to_string();
        if obj.contains("members") || obj.contains("mp-members") {
            let members = obj
                .list("members")
                .into_iter()
                .chain(obj.list("mp-members"))
                .map(str::to_string)
                .collect();
            address = Some(AddressField::Members(members));
        }
    }

    if let Some(netname) = obj.first("netname") {
        fields.netname = netname.to_string();
    }
    fields.description = obj.joined("descr").unwrap_or_default();
    fields.country = obj.joined("country").unwrap_or_default();
    fields.maintained_by = obj.joined("mnt-by").unwrap_or_default();
    fields.last_modified = obj
        .joined("last-modified")
        .or_else(|| obj.joined("changed"))
        .unwrap_or_default();
    fields.created = obj.joined("created").unwrap_or_default();
    fields.source = obj
        .first("source")
        .and_then(Source::parse)
        .or_else(|| obj.first(CUSTOM_SOURCE_ATTR).and_then(Source::parse))
        .map(|s| s.as_str().to_string())
        .unwrap_or_default();

    Some(ExtractedRecord {
        address: address?,
        fields,
    })
}

/// All values of an ARIN `Name: value` property joined by single spaces.
fn arin_property(text: &str, name: &str) -> Option<String> {
    let values: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix(name)?.strip_prefix(':'))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.join(" ").split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Stateful extractor for one dump file.
///
/// Organization objects populate the table and yield nothing; network
/// objects are resolved against organizations defined earlier in the file.
pub struct Extractor {
    file: String,
    orgs: OrgTable,
}

impl Extractor {
    /// Create an extractor with an empty organization table.
    pub fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            orgs: OrgTable::new(),
        }
    }

    /// Organizations seen so far.
    pub fn orgs(&self) -> &OrgTable {
        &self.orgs
    }

    /// Extract one object, returning a record for network objects.
    pub fn process(&mut self, object: &RawObject) -> Result<Option<ExtractedRecord>, ParseError> {
        match extract_fields(object, &self.file)? {
            ExtractedFields::ArinOrganization { org_id, record } => {
                self.orgs.insert(org_id, record);
                Ok(None)
            }
            ExtractedFields::ArinNetwork(net) => {
                let org = self.orgs.get(&net.org_id).ok_or_else(|| ParseError::Resolution {
                    context: object.context(&self.file),
                    org_id: net.org_id.clone(),
                })?;
                Ok(Some(ExtractedRecord {
                    address: AddressField::Single(net.net_range),
                    fields: RecordFields {
                        netname: net.net_name,
                        description: net.handle,
                        country: org.country.clone(),
                        maintained_by: org.name.clone(),
                        created: net.reg_date,
                        last_modified: net.updated,
                        source: net.source,
                    },
                }))
            }
            ExtractedFields::Rpsl(record) => Ok(Some(record)),
        }
    }

    /// Context for errors raised outside extraction.
    pub fn context(&self, object: &RawObject) -> ObjectContext {
        object.context(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segmenter;

    fn objects(text: &str, source: Source) -> Vec<RawObject> {
        Segmenter::new(text.as_bytes(), Some(source))
            .collect::<std::io::Result<Vec<_>>>()
            .unwrap()
    }

    fn single(text: &str, source: Source) -> RawObject {
        objects(text, source).remove(0)
    }

    #[test]
    fn test_arin_organization_then_network() {
        let dump = "\
OrgID:      ORG-X
OrgName:    Example Inc
Country:    US

NetHandle:  NET-1
OrgID:      ORG-X
NetRange:   10.0.0.0 - 10.0.0.255
RegDate:    2001-01-01
Updated:    2020-02-02
";
        let mut extractor = Extractor::new("arin_db.txt");
        let objs = objects(dump, Source::Arin);

        assert_eq!(extractor.process(&objs[0]).unwrap(), None);
        assert_eq!(extractor.orgs().len(), 1);

        let record = extractor.process(&objs[1]).unwrap().unwrap();
        assert_eq!(record.address, AddressField::Single("10.0.0.0-10.0.0.255".into()));
        assert_eq!(record.fields.netname, "");
        assert_eq!(record.fields.description, "NET-1");
        assert_eq!(record.fields.country, "US");
        assert_eq!(record.fields.maintained_by, "Example Inc");
        assert_eq!(record.fields.created, "2001-01-01");
        assert_eq!(record.fields.last_modified, "2020-02-02");
        assert_eq!(record.fields.source, "arin");
    }

    #[test]
    fn test_arin_ipv6_network_uses_v6_handle() {
        let dump = "\
OrgID: ORG-6
OrgName: Six Corp
Country: CA

V6NetHandle: NET6-2001-DB8-1
NetName: SIX
NetRange: 2001:db8:: - 2001:db8:ffff:ffff:ffff:ffff:ffff:ffff
OrgID: ORG-6
";
        let mut extractor = Extractor::new("arin_db.txt");
        let objs = objects(dump, Source::Arin);
        extractor.process(&objs[0]).unwrap();
        let record = extractor.process(&objs[1]).unwrap().unwrap();
        assert_eq!(
            record.address,
            AddressField::Single("2001:db8::-2001:db8:ffff:ffff:ffff:ffff:ffff:ffff".into())
        );
        assert_eq!(record.fields.netname, "SIX");
        assert_eq!(record.fields.description, "NET6-2001-DB8-1");
    }

    #[test]
    fn test_arin_ipv6_net_range_with_prefix_suffix() {
        let dump = "\
OrgID: ORG-6
OrgName: Six Corp
Country: CA

V6NetHandle: NET6-2001-DB8-1
NetRange: 2001:db8::/32 - 2001:db8:ffff:ffff:ffff:ffff:ffff:ffff/32
OrgID: ORG-6
";
        let mut extractor = Extractor::new("arin_db.txt");
        let objs = objects(dump, Source::Arin);
        extractor.process(&objs[0]).unwrap();
        let record = extractor.process(&objs[1]).unwrap().unwrap();
        assert_eq!(
            record.address,
            AddressField::Single("2001:db8::-2001:db8:ffff:ffff:ffff:ffff:ffff:ffff".into())
        );

        let prefixes: Vec<String> = crate::normalize::normalize(&record)
            .into_iter()
            .map(|r| r.unwrap().address_prefix)
            .collect();
        assert_eq!(prefixes, vec!["2001:db8::/32"]);
    }

    #[test]
    fn test_arin_unknown_org_is_resolution_error() {
        let obj = single("NetHandle: NET-1\nOrgID: ORG-MISSING\nNetRange: 10.0.0.0 - 10.0.0.255\n", Source::Arin);
        let err = Extractor::new("arin_db.txt").process(&obj).unwrap_err();
        match err {
            ParseError::Resolution { org_id, context } => {
                assert_eq!(org_id, "ORG-MISSING");
                assert_eq!(context.file, "arin_db.txt");
                assert_eq!(context.snippet, "NetHandle: NET-1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_arin_bad_net_range_is_format_error() {
        let obj = single("NetHandle: NET-1\nOrgID: ORG-X\nNetRange: garbage\n", Source::Arin);
        assert!(matches!(
            extract_fields(&obj, "arin_db.txt"),
            Err(ParseError::Format { .. })
        ));
    }

    #[test]
    fn test_org_overwrite() {
        let dump = "OrgID: A\nOrgName: First\n\nOrgID: A\nOrgName: Second\nCountry: DE\n";
        let mut extractor = Extractor::new("arin_db.txt");
        for obj in objects(dump, Source::Arin) {
            extractor.process(&obj).unwrap();
        }
        assert_eq!(extractor.orgs().len(), 1);
        assert_eq!(
            extractor.orgs().get("A"),
            Some(&OrgRecord {
                name: "Second".into(),
                country: "DE".into()
            })
        );
    }

    #[test]
    fn test_rpsl_inetnum_fields() {
        let obj = single(
            "\
inetnum:        192.0.2.0 - 192.0.2.255
netname:        TEST-NET
descr:          Documentation
descr:          range
country:        NL
mnt-by:         MNT-A
created:        2010-01-01T00:00:00Z
last-modified:  2020-01-01T00:00:00Z
changed:        old@example.net 20050101
source:         RIPE
",
            Source::Ripe,
        );
        let record = Extractor::new("ripe.db.inetnum.gz").process(&obj).unwrap().unwrap();
        assert_eq!(record.address, AddressField::Single("192.0.2.0 - 192.0.2.255".into()));
        assert_eq!(record.fields.netname, "TEST-NET");
        assert_eq!(record.fields.description, "Documentation range");
        assert_eq!(record.fields.country, "NL");
        assert_eq!(record.fields.maintained_by, "MNT-A");
        assert_eq!(record.fields.created, "2010-01-01T00:00:00Z");
        assert_eq!(record.fields.last_modified, "2020-01-01T00:00:00Z");
        assert_eq!(record.fields.source, "ripe");
    }

    #[test]
    fn test_rpsl_changed_used_without_last_modified() {
        let obj = single("route: 10.0.0.0/8\nchanged: a@b.net 20010101\nchanged: c@d.net 20020202\n", Source::Radb);
        let record = Extractor::new("radb.db.gz").process(&obj).unwrap().unwrap();
        assert_eq!(record.fields.last_modified, "a@b.net 20010101 c@d.net 20020202");
    }

    #[test]
    fn test_rpsl_source_falls_back_to_file_source() {
        let obj = single("route6: 2001:db8::/32\norigin: AS1\n", Source::Jpirr);
        let record = Extractor::new("jpirr.db.gz").process(&obj).unwrap().unwrap();
        assert_eq!(record.fields.source, "jpirr");

        let obj = single("route: 10.0.0.0/8\nsource: RIPE-NONAUTH\n", Source::Ripe);
        let record = Extractor::new("ripe.db.route.gz").process(&obj).unwrap().unwrap();
        assert_eq!(record.fields.source, "ripe");
    }

    #[test]
    fn test_route_set_members() {
        let obj = single(
            "route-set: RS-EXAMPLE\nmembers: 10.0.0.0/24, 10.0.1.0/24\nmp-members: 2001:db8::/48\n",
            Source::Radb,
        );
        let record = Extractor::new("radb.db.gz").process(&obj).unwrap().unwrap();
        assert_eq!(
            record.address,
            AddressField::Members(vec![
                "10.0.0.0/24".into(),
                "10.0.1.0/24".into(),
                "2001:db8::/48".into()
            ])
        );
        assert_eq!(record.fields.netname, "RS-EXAMPLE");
    }

    #[test]
    fn test_rpsl_without_address_is_format_error() {
        let obj = single("inet-rtr: rtr.example.net\nlocal-as: AS1\n", Source::Radb);
        assert!(matches!(
            Extractor::new("radb.db.gz").process(&obj),
            Err(ParseError::Format { .. })
        ));
    }

    #[test]
    fn test_rpsl_grammar_failure_is_format_error() {
        let obj = single("route: 10.0.0.0/8\nnot an attribute\n", Source::Radb);
        let err = Extractor::new("radb.db.gz").process(&obj).unwrap_err();
        assert!(err.to_string().contains("malformed attribute line"));
    }

    #[test]
    fn test_arin_property_joins_and_collapses() {
        let text = "Comment: first   line\nComment: second\nCommentary: no\n";
        assert_eq!(arin_property(text, "Comment").as_deref(), Some("first line second"));
        assert_eq!(arin_property(text, "Missing"), None);
    }
}
