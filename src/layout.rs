//! Surface sizing and client-to-surface coordinate mapping.

pub(crate) mod controller;
