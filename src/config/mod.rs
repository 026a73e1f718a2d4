// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod inputs;
pub mod loader;
pub mod validation;

pub use core::{
    AnalyzerConfig, HttpConfig, IdentityProviderConfig, InputPaths, LoggingConfig, ServerConfig,
    UserCredentials,
};

pub use inputs::{
    load_endpoints, load_matrix, prepare_catalog, prune_matrix, resolve_ranking, resolve_url,
    EndpointsFile, MatrixFile,
};

pub use loader::{apply_env_overrides, load_config, read_file, ConfigFormat, ConfigLoader};

pub use validation::ConfigValidator;
