//! Wire format types for both dialects

pub mod antigravity;
pub mod claude;
