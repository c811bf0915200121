use crate::error::{ArtifactError, DecompositionError};
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// The compiled artifact for one route: a single assembled function plus its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionData {
    pub function_name: String,
    pub code: String,
    pub requirements_manifest: String,
    pub endpoint_name: String,
}

impl FunctionData {
    /// Saves the artifact to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes =
            encode_to_vec(self, standard()).map_err(|e| ArtifactError::Encode(e.to_string()))?;
        let mut file = fs::File::create(path).map_err(|source| ArtifactError::Io {
            path: path.to_string(),
            source,
        })?;
        file.write_all(&bytes).map_err(|source| ArtifactError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(())
    }

    /// Loads an artifact from a file.
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let mut file = fs::File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| ArtifactError::Io {
                path: path.to_string(),
                source,
            })?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes an artifact from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        decode_from_slice(bytes, standard())
            .map(|(data, _)| data) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| ArtifactError::Decode(e.to_string()))
    }
}

/// A reference to a function that a generated body calls but that is not implemented yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionStub {
    #[serde(default)]
    pub id: Option<u64>,
    pub function_name: String,
    /// Signature and docstring the child must honour.
    #[serde(default)]
    pub template: String,
}

impl FunctionStub {
    pub fn new(function_name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: None,
            function_name: function_name.into(),
            template: template.into(),
        }
    }
}

/// A function materialized by the generation oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    #[serde(default)]
    pub id: Option<u64>,
    pub function_name: String,
    pub template: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub child_functions: Vec<FunctionStub>,
}

impl FunctionDefinition {
    pub fn new(function_name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: None,
            function_name: function_name.into(),
            template: template.into(),
            code: String::new(),
            child_functions: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_child(mut self, child: FunctionStub) -> Self {
        self.child_functions.push(child);
        self
    }

    /// Parses the oracle's structured output for `function_name`.
    ///
    /// Any schema mismatch is reported as [`DecompositionError::OracleOutputInvalid`],
    /// leaving retries to the caller.
    pub fn from_oracle_json(function_name: &str, json: &str) -> Result<Self, DecompositionError> {
        let definition: FunctionDefinition =
            serde_json::from_str(json).map_err(|e| DecompositionError::OracleOutputInvalid {
                function: function_name.to_string(),
                message: e.to_string(),
            })?;
        definition.validate(function_name)?;
        Ok(definition)
    }

    pub(crate) fn validate(&self, function_name: &str) -> Result<(), DecompositionError> {
        let invalid = |message: String| DecompositionError::OracleOutputInvalid {
            function: function_name.to_string(),
            message,
        };
        if self.function_name.trim().is_empty() {
            return Err(invalid("function name is empty".to_string()));
        }
        if let Some(child) = self
            .child_functions
            .iter()
            .find(|c| c.function_name.trim().is_empty())
        {
            return Err(invalid(format!(
                "child function with template '{}' has no name",
                child.template
            )));
        }
        Ok(())
    }
}
