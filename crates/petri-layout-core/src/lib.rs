//! Petri Layout Core Types and Definitions
//!
//! This crate provides the foundational types for laying out Petri nets.
//! It includes:
//!
//! - **Identifiers**: String-interned node identifiers ([`identifier::Id`])
//! - **Colors**: CSS color handling for arc strokes ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Shapes**: Place and transition shape kinds ([`shape::ShapeKind`])
//! - **Attach points**: Perimeter points arcs terminate on ([`attach`] module)

pub mod attach;
pub mod color;
pub mod geometry;
pub mod identifier;
pub mod shape;
