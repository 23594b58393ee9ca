//! # Filtering & Sorting
//!
//! Translates client filter trees and sort lists into SQL fragments whose values are
//! bound out-of-band through a [`ParameterMap`].
//!
//! ## Filter grammar
//!
//! ```json
//! {"filter": {"logic": "and", "subFilters": [
//!     {"field": "status", "operator": "eq", "value": ["ACTIVE", "PENDING"]},
//!     {"field": "amount", "operator": "between", "value": [100, null]},
//!     {"field": "keyword", "value": "blue"}
//! ]}}
//! ```
//!
//! compiles (for `status → STATUS_CD`, `amount → AMOUNT` and keyword columns `NAME`,
//! `DESCRIPTION`) to
//!
//! ```sql
//! 1=1 AND (STATUS_CD IN (:p_0__0)) AND (AMOUNT >= :p_1__0)
//!     AND (NAME LIKE :p_2__0 OR DESCRIPTION LIKE :p_2__0)
//! ```
//!
//! | Operator   | Scalar value          | Array value          |
//! |------------|-----------------------|----------------------|
//! | `eq`       | `col = :p`            | `col IN (:p)`        |
//! | `contains` | `col LIKE :p` (`%v%`) | `col IN (:p)`        |
//! | `between`  | rejected              | `[from, to]`, either side may be null |
//! | `gt` `ge` `lt` `le` | `col > :p` ... | rejected            |
//!
//! A predicate whose value is null adds no constraint.

pub mod conditions;
pub mod params;
pub mod search;
pub mod sort;

pub use conditions::{FilterCompiler, Fragment};
pub use params::ParameterMap;
pub use sort::order_by_clause;
