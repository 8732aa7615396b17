// portside-core/src/domain/model/mod.rs

pub mod inspection;
pub mod reference;
pub mod vessel;

pub use inspection::{
    Deficiency, DeficiencySummary, Inspection, OUTCOME_CLEAN, Severity,
};
pub use reference::{
    ActionCode, DeficiencyCode, MouRegion, PortEntry, ReferenceMiss, ReferenceSet, UNKNOWN,
};
pub use vessel::{DocCompanyMaster, OwnerMaster, Vessel};
