//! Behaviour tests for the audit context.

mod domain_tests;
mod pipeline_tests;
