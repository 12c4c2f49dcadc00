//! Data models for normalized router status readings.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Closed vocabulary of status fields published by the poller.
///
/// Every reading the extractor can produce maps to exactly one of these
/// keys; consumers never see ad-hoc vendor field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CableModemStatus,
    PrimaryDownstreamChannel,
    DocsisVersion,
    CableModemRegistration,
    WanIpProvisionMode,
    FailSafeMode,
    NoRfDetected,
    Docsis30Downstream,
    Docsis30Upstream,
    Docsis31Downstream,
    Docsis31Upstream,
    TotalDownstreamChannels,
    TotalUpstreamChannels,
    LastUpdateTime,
    IspProvider,
    NetworkAccess,
    MaxCpes,
    BaselinePrivacy,
    DocsisMode,
    ConfigFile,
    PrimaryDownstreamSfid,
    PrimaryDownstreamMaxTrafficRate,
    PrimaryDownstreamMaxTrafficBurst,
    PrimaryDownstreamMinTrafficRate,
    PrimaryUpstreamSfid,
    PrimaryUpstreamMaxTrafficRate,
    PrimaryUpstreamMaxTrafficBurst,
    PrimaryUpstreamMinTrafficRate,
    PrimaryUpstreamMaxConcatenatedBurst,
    PrimaryUpstreamSchedulingType,
}

impl Field {
    /// All fields in display order.
    pub const ALL: [Field; 30] = [
        Field::CableModemStatus,
        Field::PrimaryDownstreamChannel,
        Field::DocsisVersion,
        Field::CableModemRegistration,
        Field::WanIpProvisionMode,
        Field::FailSafeMode,
        Field::NoRfDetected,
        Field::Docsis30Downstream,
        Field::Docsis30Upstream,
        Field::Docsis31Downstream,
        Field::Docsis31Upstream,
        Field::TotalDownstreamChannels,
        Field::TotalUpstreamChannels,
        Field::LastUpdateTime,
        Field::IspProvider,
        Field::NetworkAccess,
        Field::MaxCpes,
        Field::BaselinePrivacy,
        Field::DocsisMode,
        Field::ConfigFile,
        Field::PrimaryDownstreamSfid,
        Field::PrimaryDownstreamMaxTrafficRate,
        Field::PrimaryDownstreamMaxTrafficBurst,
        Field::PrimaryDownstreamMinTrafficRate,
        Field::PrimaryUpstreamSfid,
        Field::PrimaryUpstreamMaxTrafficRate,
        Field::PrimaryUpstreamMaxTrafficBurst,
        Field::PrimaryUpstreamMinTrafficRate,
        Field::PrimaryUpstreamMaxConcatenatedBurst,
        Field::PrimaryUpstreamSchedulingType,
    ];

    /// Stable string key used in the JSON API and templates.
    pub const fn key(self) -> &'static str {
        match self {
            Field::CableModemStatus => "cable_modem_status",
            Field::PrimaryDownstreamChannel => "primary_downstream_channel",
            Field::DocsisVersion => "docsis_version",
            Field::CableModemRegistration => "cable_modem_registration",
            Field::WanIpProvisionMode => "wan_ip_provision_mode",
            Field::FailSafeMode => "fail_safe_mode",
            Field::NoRfDetected => "no_rf_detected",
            Field::Docsis30Downstream => "docsis_3_0_downstream",
            Field::Docsis30Upstream => "docsis_3_0_upstream",
            Field::Docsis31Downstream => "docsis_3_1_downstream",
            Field::Docsis31Upstream => "docsis_3_1_upstream",
            Field::TotalDownstreamChannels => "total_downstream_channels",
            Field::TotalUpstreamChannels => "total_upstream_channels",
            Field::LastUpdateTime => "last_update_time",
            Field::IspProvider => "isp_provider",
            Field::NetworkAccess => "network_access",
            Field::MaxCpes => "max_cpes",
            Field::BaselinePrivacy => "baseline_privacy",
            Field::DocsisMode => "docsis_mode",
            Field::ConfigFile => "config_file",
            Field::PrimaryDownstreamSfid => "primary_downstream_sfid",
            Field::PrimaryDownstreamMaxTrafficRate => "primary_downstream_max_traffic_rate",
            Field::PrimaryDownstreamMaxTrafficBurst => "primary_downstream_max_traffic_burst",
            Field::PrimaryDownstreamMinTrafficRate => "primary_downstream_min_traffic_rate",
            Field::PrimaryUpstreamSfid => "primary_upstream_sfid",
            Field::PrimaryUpstreamMaxTrafficRate => "primary_upstream_max_traffic_rate",
            Field::PrimaryUpstreamMaxTrafficBurst => "primary_upstream_max_traffic_burst",
            Field::PrimaryUpstreamMinTrafficRate => "primary_upstream_min_traffic_rate",
            Field::PrimaryUpstreamMaxConcatenatedBurst => "primary_upstream_max_concatenated_burst",
            Field::PrimaryUpstreamSchedulingType => "primary_upstream_scheduling_type",
        }
    }

    /// Display metadata for the dashboard and JSON API.
    pub const fn descriptor(self) -> FieldDescriptor {
        match self {
            Field::CableModemStatus => {
                FieldDescriptor::new("Cable Modem Status", "mdi:router-wireless")
            }
            Field::PrimaryDownstreamChannel => {
                FieldDescriptor::new("Primary Downstream Channel", "mdi:download")
            }
            Field::DocsisVersion => FieldDescriptor::new("DOCSIS Version", "mdi:network"),
            Field::CableModemRegistration => {
                FieldDescriptor::new("Cable Modem Registration", "mdi:check-network")
            }
            Field::WanIpProvisionMode => {
                FieldDescriptor::new("WAN IP Provision Mode", "mdi:ip-network")
            }
            Field::FailSafeMode => FieldDescriptor::new("Fail Safe Mode", "mdi:alert-circle"),
            Field::NoRfDetected => FieldDescriptor::new("No RF Detected", "mdi:antenna"),
            Field::Docsis30Downstream => {
                FieldDescriptor::new("DOCSIS 3.0 Downstream Channels", "mdi:download-network")
                    .with_unit("channels")
            }
            Field::Docsis30Upstream => {
                FieldDescriptor::new("DOCSIS 3.0 Upstream Channels", "mdi:upload-network")
                    .with_unit("channels")
            }
            Field::Docsis31Downstream => {
                FieldDescriptor::new("DOCSIS 3.1 Downstream Channels", "mdi:download-network")
                    .with_unit("channels")
            }
            Field::Docsis31Upstream => {
                FieldDescriptor::new("DOCSIS 3.1 Upstream Channels", "mdi:upload-network")
                    .with_unit("channels")
            }
            Field::TotalDownstreamChannels => {
                FieldDescriptor::new("Total Downstream Channels", "mdi:download-multiple")
                    .with_unit("channels")
            }
            Field::TotalUpstreamChannels => {
                FieldDescriptor::new("Total Upstream Channels", "mdi:upload-multiple")
                    .with_unit("channels")
            }
            Field::LastUpdateTime => {
                FieldDescriptor::new("Last Update Time", "mdi:clock-outline").diagnostic()
            }
            Field::IspProvider => FieldDescriptor::new("ISP Provider", "mdi:account-network"),
            Field::NetworkAccess => FieldDescriptor::new("Network Access", "mdi:network"),
            Field::MaxCpes => FieldDescriptor::new("Maximum Number of CPEs", "mdi:devices"),
            Field::BaselinePrivacy => FieldDescriptor::new("Baseline Privacy", "mdi:shield"),
            Field::DocsisMode => FieldDescriptor::new("DOCSIS Mode", "mdi:network"),
            Field::ConfigFile => FieldDescriptor::new("Config File", "mdi:file-document"),
            Field::PrimaryDownstreamSfid => {
                FieldDescriptor::new("Primary Downstream SFID", "mdi:download")
            }
            Field::PrimaryDownstreamMaxTrafficRate => {
                FieldDescriptor::new("Primary Downstream Max Traffic Rate", "mdi:download")
            }
            Field::PrimaryDownstreamMaxTrafficBurst => {
                FieldDescriptor::new("Primary Downstream Max Traffic Burst", "mdi:download")
            }
            Field::PrimaryDownstreamMinTrafficRate => {
                FieldDescriptor::new("Primary Downstream Min Traffic Rate", "mdi:download")
            }
            Field::PrimaryUpstreamSfid => {
                FieldDescriptor::new("Primary Upstream SFID", "mdi:upload")
            }
            Field::PrimaryUpstreamMaxTrafficRate => {
                FieldDescriptor::new("Primary Upstream Max Traffic Rate", "mdi:upload")
            }
            Field::PrimaryUpstreamMaxTrafficBurst => {
                FieldDescriptor::new("Primary Upstream Max Traffic Burst", "mdi:upload")
            }
            Field::PrimaryUpstreamMinTrafficRate => {
                FieldDescriptor::new("Primary Upstream Min Traffic Rate", "mdi:upload")
            }
            Field::PrimaryUpstreamMaxConcatenatedBurst => {
                FieldDescriptor::new("Primary Upstream Max Concatenated Burst", "mdi:upload")
            }
            Field::PrimaryUpstreamSchedulingType => {
                FieldDescriptor::new("Primary Upstream Scheduling Type", "mdi:upload")
            }
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Static display metadata attached to a [`Field`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub icon: &'static str,
    pub unit: Option<&'static str>,
    /// Diagnostic fields describe the poller itself rather than the modem.
    pub diagnostic: bool,
}

impl FieldDescriptor {
    const fn new(name: &'static str, icon: &'static str) -> Self {
        Self {
            name,
            icon,
            unit: None,
            diagnostic: false,
        }
    }

    const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    const fn diagnostic(mut self) -> Self {
        self.diagnostic = true;
        self
    }
}

/// A single decoded reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Count(i64),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_count(&self) -> Option<i64> {
        match self {
            Value::Count(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Count(n) => write!(f, "{}", n),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

/// Normalized output of one refresh cycle.
///
/// Absent keys mean "unknown this cycle"; there is no null value. A record
/// is rebuilt from scratch every cycle, so a field the router stopped
/// reporting disappears rather than going stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRecord {
    fields: BTreeMap<Field, Value>,
}

impl StatusRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field unconditionally. Used within a single strategy.
    pub fn set(&mut self, field: Field, value: Value) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }

    /// Folds another partial record in with first-writer-wins semantics:
    /// keys already present in `self` are kept, everything else is taken
    /// from `other`.
    pub fn absorb(&mut self, other: StatusRecord) {
        for (field, value) in other.fields {
            self.fields.entry(field).or_insert(value);
        }
    }

    fn count_of(&self, field: Field) -> Option<i64> {
        self.get(field).and_then(Value::as_count)
    }

    /// Recomputes the derived channel totals from the merged per-version
    /// counts. A total is present only when both of its inputs are.
    pub fn finalize_totals(&mut self) {
        let downstream = self
            .count_of(Field::Docsis30Downstream)
            .zip(self.count_of(Field::Docsis31Downstream));
        match downstream {
            Some((v30, v31)) => self.set(Field::TotalDownstreamChannels, Value::Count(v30 + v31)),
            None => {
                self.fields.remove(&Field::TotalDownstreamChannels);
            }
        }

        let upstream = self
            .count_of(Field::Docsis30Upstream)
            .zip(self.count_of(Field::Docsis31Upstream));
        match upstream {
            Some((v30, v31)) => self.set(Field::TotalUpstreamChannels, Value::Count(v30 + v31)),
            None => {
                self.fields.remove(&Field::TotalUpstreamChannels);
            }
        }
    }
}

impl Serialize for StatusRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}
