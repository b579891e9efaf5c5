use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    str::FromStr,
};

use async_trait::async_trait;
use tempdir::TempDir;
use tokio::process::Command;
use tracing::{debug, instrument};
use zk_primitives::Element;

use crate::{CallData, CircuitInput, CircuitKind, Proof, Prover, ProverError};

/// Proves with the `snarkjs` command line tool against PLONK circuit builds
///
/// Artifacts are expected in the layout the circuit build produces:
/// `{build_dir}/{Name}/{Name}_js/{Name}.wasm` and `{build_dir}/{Name}/{Name}.zkey`.
#[derive(Debug, Clone)]
pub struct SnarkjsProver {
    build_dir: PathBuf,
    binary: PathBuf,
}

impl SnarkjsProver {
    /// A prover reading circuit artifacts from `build_dir`, running `snarkjs` from `PATH`
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
            binary: PathBuf::from("snarkjs"),
        }
    }

    /// Run a specific `snarkjs` executable
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// The witness generator for `circuit`
    #[must_use]
    pub fn wasm_path(&self, circuit: CircuitKind) -> PathBuf {
        let name = circuit.name();
        self.build_dir
            .join(name)
            .join(format!("{name}_js"))
            .join(format!("{name}.wasm"))
    }

    /// The proving key for `circuit`
    #[must_use]
    pub fn zkey_path(&self, circuit: CircuitKind) -> PathBuf {
        let name = circuit.name();
        self.build_dir.join(name).join(format!("{name}.zkey"))
    }

    async fn run(&self, args: &[&OsStr]) -> Result<Vec<u8>, ProverError> {
        let output = Command::new(&self.binary).args(args).output().await?;

        if !output.status.success() {
            return Err(ProverError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            ));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Prover for SnarkjsProver {
    #[instrument(err, skip(self, input))]
    async fn full_prove(
        &self,
        circuit: CircuitKind,
        input: &CircuitInput,
    ) -> Result<Proof, ProverError> {
        let dir = TempDir::new("shield-prove")?;
        let input_path = dir.path().join("input.json");
        let proof_path = dir.path().join("proof.json");
        let public_path = dir.path().join("public.json");

        tokio::fs::write(&input_path, serde_json::to_vec(input)?).await?;

        let wasm = self.wasm_path(circuit);
        let zkey = self.zkey_path(circuit);
        self.run(&[
            OsStr::new("plonk"),
            OsStr::new("fullprove"),
            input_path.as_os_str(),
            wasm.as_os_str(),
            zkey.as_os_str(),
            proof_path.as_os_str(),
            public_path.as_os_str(),
        ])
        .await?;

        let proof = serde_json::from_slice(&tokio::fs::read(&proof_path).await?)?;
        let public_signals = serde_json::from_slice(&tokio::fs::read(&public_path).await?)?;

        debug!(%circuit, "snarkjs produced a proof");

        Ok(Proof {
            proof,
            public_signals,
        })
    }

    async fn export_call_data(&self, proof: &Proof) -> Result<CallData, ProverError> {
        let dir = TempDir::new("shield-calldata")?;
        let proof_path = dir.path().join("proof.json");
        let public_path = dir.path().join("public.json");

        write_json(&proof_path, &proof.proof).await?;
        write_json(&public_path, &proof.public_signals).await?;

        let stdout = self
            .run(&[
                OsStr::new("zkey"),
                OsStr::new("export"),
                OsStr::new("soliditycalldata"),
                public_path.as_os_str(),
                proof_path.as_os_str(),
            ])
            .await?;

        let stdout =
            String::from_utf8(stdout).map_err(|err| ProverError::Malformed(err.to_string()))?;

        parse_call_data(&stdout)
    }
}

async fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<(), ProverError> {
    tokio::fs::write(path, serde_json::to_vec(value)?).await?;
    Ok(())
}

/// Split PLONK solidity calldata, `0x<proof>,[<signal>, ...]`, into proof bytes and signals
pub fn parse_call_data(calldata: &str) -> Result<CallData, ProverError> {
    let (proof, signals) = calldata
        .trim()
        .split_once(',')
        .ok_or_else(|| ProverError::Malformed("calldata has no public signals".to_owned()))?;

    let proof = proof.trim();
    let proof = hex::decode(proof.strip_prefix("0x").unwrap_or(proof))
        .map_err(|err| ProverError::Malformed(format!("proof is not hex: {err}")))?;

    let public_signals = serde_json::from_str::<Vec<String>>(signals.trim())?
        .iter()
        .map(|signal| {
            Element::from_str(signal)
                .map_err(|err| ProverError::Malformed(format!("bad signal {signal}: {err}")))
        })
        .collect::<Result<_, _>>()?;

    Ok(CallData {
        proof,
        public_signals,
    })
}
