//! Metro journey planner server.
//!
//! A web application that answers: "how do I get from this platform to
//! that one, and which trains do I take?"

pub mod cache;
pub mod domain;
pub mod network;
pub mod planner;
pub mod timetable;
pub mod web;
