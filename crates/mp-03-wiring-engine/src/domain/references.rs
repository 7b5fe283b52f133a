//! # Peer References
//!
//! Which peers each per-tenant unit must be told about at init time.
//!
//! ```text
//!   Core ──────────► CertificateIssuer ──► Core
//!    │  └──────────► PolicyIssuer ───────► Core, EpochManager
//!    └─────────────► EpochManager ───────► Core, CertificateIssuer, PolicyIssuer
//! ```
//!
//! The graph is cyclic, so no construction order could satisfy it if peers
//! were passed to constructors.

use shared_types::TenantUnitKind;

/// Peers referenced by `kind`'s init, in argument order.
#[must_use]
pub fn peers_of(kind: TenantUnitKind) -> &'static [TenantUnitKind] {
    use TenantUnitKind::{CertificateIssuer, Core, EpochManager, PolicyIssuer};
    match kind {
        Core => &[CertificateIssuer, PolicyIssuer, EpochManager],
        CertificateIssuer => &[Core],
        PolicyIssuer => &[Core, EpochManager],
        EpochManager => &[Core, CertificateIssuer, PolicyIssuer],
    }
}
