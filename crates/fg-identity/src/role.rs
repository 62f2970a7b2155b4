// role.rs — Role and capability vocabulary.
//
// Two roles mirror the research desk hierarchy: junior analysts may look
// things up, senior managers may additionally persist reports and touch
// sensitive data. The permission matrix lives here as code, not config,
// so the mapping is reviewable in one place and covered by tests.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named permission. Tools declare which capability they require;
/// roles grant a fixed set of them.
///
/// `Ord` matters: capability sets are `BTreeSet`s so that serialized
/// identities and audit metadata list capabilities in a stable order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Search the internal research-note corpus.
    SearchInternal,
    /// Search the public web.
    SearchWeb,
    /// Look up a single security's quote.
    GetStockPrice,
    /// Look up the major index summary.
    GetMarketSummary,
    /// Persist a research report.
    SaveReport,
    /// Read data classified as sensitive.
    AccessSensitiveData,
    /// View the audit dashboard read path.
    ViewAdminDashboard,
}

impl Capability {
    /// The lowest-privilege capability held by every role.
    ///
    /// A tool registered without a declared capability is treated as
    /// requiring this — there is no "no check" registration.
    pub fn baseline() -> Self {
        Capability::SearchInternal
    }

    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SearchInternal => "search_internal",
            Capability::SearchWeb => "search_web",
            Capability::GetStockPrice => "get_stock_price",
            Capability::GetMarketSummary => "get_market_summary",
            Capability::SaveReport => "save_report",
            Capability::AccessSensitiveData => "access_sensitive_data",
            Capability::ViewAdminDashboard => "view_admin_dashboard",
        }
    }
}

/// The role hierarchy. Senior strictly supersets Junior — asserted in
/// tests below, relied on by the policy engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Junior,
    Senior,
}

impl Role {
    /// The fixed permission matrix for this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Junior => &[
                Capability::SearchInternal,
                Capability::SearchWeb,
                Capability::GetStockPrice,
                Capability::GetMarketSummary,
            ],
            Role::Senior => &[
                Capability::SearchInternal,
                Capability::SearchWeb,
                Capability::GetStockPrice,
                Capability::GetMarketSummary,
                Capability::SaveReport,
                Capability::AccessSensitiveData,
                Capability::ViewAdminDashboard,
            ],
        }
    }

    /// The matrix as an owned set, for storing on an [`crate::Identity`].
    pub fn capability_set(&self) -> BTreeSet<Capability> {
        self.capabilities().iter().copied().collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Junior => "junior",
            Role::Senior => "senior",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn senior_strictly_supersets_junior() {
        let junior = Role::Junior.capability_set();
        let senior = Role::Senior.capability_set();
        assert!(senior.is_superset(&junior));
        assert!(senior.len() > junior.len());
    }

    #[test]
    fn junior_cannot_save_reports() {
        assert!(!Role::Junior.capability_set().contains(&Capability::SaveReport));
        assert!(Role::Senior.capability_set().contains(&Capability::SaveReport));
    }

    #[test]
    fn baseline_is_held_by_every_role() {
        for role in [Role::Junior, Role::Senior] {
            assert!(role.capability_set().contains(&Capability::baseline()));
        }
    }

    #[test]
    fn capability_serializes_as_snake_case() {
        let json = serde_json::to_string(&Capability::SaveReport).unwrap();
        assert_eq!(json, "\"save_report\"");
        // as_str must agree with the serde representation.
        assert_eq!(
            serde_json::to_string(&Capability::GetStockPrice).unwrap(),
            format!("\"{}\"", Capability::GetStockPrice.as_str())
        );
    }
}
