//! # pyvm - Python Interpreter Updater
//!
//! pyvm keeps a machine's Python interpreter current. It detects the
//! locally installed version, resolves the latest release published on
//! python.org, and installs newer versions side by side through each
//! platform's official distribution channel.
//!
//! ## Features
//!
//! - **Platform probing**: OS family, architecture, and privilege level
//! - **Local detection**: queries `python3`/`python` on PATH
//! - **Remote resolution**: bounded retry with exponential backoff
//! - **Side-by-side installs**: the existing interpreter is never
//!   removed or demoted
//! - **Per-platform strategies**: passive installer on Windows, source
//!   build with `make altinstall` on Linux, official pkg on macOS
//!
//! ## Architecture
//!
//! The crate is organized into focused modules:
//!
//! - [`platform`]: Host identity and elevation probing
//! - [`interpreter`]: Local interpreter discovery and version detection
//! - [`version`]: Strict version parsing, ordering, and the update
//!   decision
//! - [`resolver`]: Remote latest-release resolution with retry
//! - [`install`]: OS installation strategies behind a common trait
//! - [`orchestrator`]: The run state machine and event channel
//! - [`config`]: Global configuration file handling
//! - [`cli`]: Command-line interface
//! - [`core`]: Error types and user-facing error context
//!
//! ## Usage
//!
//! ```bash
//! # Check for updates
//! pyvm check
//!
//! # Install the latest release
//! pyvm update
//!
//! # Host and interpreter details
//! pyvm info
//! ```
//!
//! ## Platform Support
//!
//! pyvm works on Windows, macOS, and Linux, selecting the installation
//! procedure from the probed OS family at run time.

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod install;
pub mod interpreter;
pub mod orchestrator;
pub mod platform;
pub mod resolver;
pub mod version;
