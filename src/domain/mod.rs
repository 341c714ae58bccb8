//! Domain Layer
//!
//! The core of the deploy tool - pure logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Core domain entities (ChangeRecord, CommitInfo, DeployRecord, FileChunk)
//! - `value_objects/` - Immutable value types (PartitionPolicy, BranchScope, CommitMarkers)
//! - `services/` - Domain services (partitioner, replay planning)
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system, git or the network directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
