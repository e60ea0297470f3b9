//! Search OpenAlex and Crossref, resolve DOIs, and format citations, driven
//! by a tool-calling chat agent.

pub mod agent;
pub mod apis;
pub mod citation;
pub mod config;
pub mod mcp;
pub mod runner;
pub mod tools;
pub mod web;
