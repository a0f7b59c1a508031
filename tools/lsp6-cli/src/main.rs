use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy_primitives::{Address, FixedBytes, U256};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use k256::ecdsa::SigningKey;
use lsp6_permission_types::{
    allowed_calls::{ANY_ADDRESS, ANY_FUNCTION, ANY_STANDARD},
    encode_allowed_calls, encode_allowed_data_keys,
    keys::{allowed_calls_key, allowed_data_keys_key, permissions_array_element_key, permissions_key},
    AllowedCall, AllowedDataKey, CallTypes, PermissionSet,
};
use lsp6_relay_encoder::{
    execute_relay_call_calldata, nonce_word, relay_digest, sign_relay_call, signer_address,
    validity_window, RelayCall,
};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Build LSP6 permission values and signed relay calls.
///
/// Everything is printed as JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Increase logging verbosity (-v = warn, -vv = info, -vvv = debug, -vvvv = trace).
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write the JSON output to this file.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Permission word from permission names, eg `CALL,TRANSFERVALUE`.
    Permissions {
        #[arg(value_delimiter = ',', required = true)]
        names: Vec<String>,
    },
    /// Encode an AllowedCalls value.
    ///
    /// Each entry is `CALLTYPES:address:standard:selector`, where CALLTYPES is a `|`-separated
    /// list of VALUE, CALL, STATICCALL, DELEGATECALL and `*` stands for any.
    /// Example: `CALL|VALUE:0x…:*:0xa9059cbb`.
    AllowedCalls {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Encode an AllowedERC725YDataKeys value from hex key prefixes (1 to 32 bytes each).
    AllowedDataKeys {
        #[arg(required = true)]
        prefixes: Vec<String>,
    },
    /// Data keys under which a controller's settings are stored.
    DataKeys {
        controller: Address,
        /// Also print the `AddressPermissions[index]` key.
        #[arg(long)]
        index: Option<u128>,
    },
    /// Sign an account payload as an LSP25 relay call.
    Relay(RelayArgs),
}

/// What a relayer needs to submit a signed call.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SignedRelayOutput {
    signer: Address,
    digest: FixedBytes<32>,
    nonce: U256,
    validity_timestamps: U256,
    signature: String,
    calldata: String,
}

#[derive(Args, Debug)]
struct RelayArgs {
    /// Controller private key (hex string, 0x...).
    #[arg(long, env = "LSP6_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    #[arg(long, env = "LSP6_CHAIN_ID")]
    chain_id: u64,

    /// Account controlled through the key manager.
    #[arg(long, env = "LSP6_ACCOUNT")]
    account: Address,

    /// Nonce channel.
    #[arg(long, default_value_t = 0)]
    channel: u128,

    /// Sequence on the channel; read it from `getNonce(signer, channel)`.
    #[arg(long)]
    sequence: u128,

    /// Not valid before this RFC 3339 time.
    #[arg(long)]
    valid_from: Option<String>,

    /// Not valid after this RFC 3339 time.
    #[arg(long)]
    valid_until: Option<String>,

    /// Value the relayer attaches, in wei.
    #[arg(long, default_value = "0")]
    value: U256,

    /// Account calldata to run (hex).
    #[arg(long)]
    payload: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = match &cli.command {
        Command::Permissions { names } => permissions(names)?,
        Command::AllowedCalls { entries } => allowed_calls(entries)?,
        Command::AllowedDataKeys { prefixes } => allowed_data_keys(prefixes)?,
        Command::DataKeys { controller, index } => data_keys(*controller, *index),
        Command::Relay(args) => relay(args)?,
    };

    println!("{}", serde_json::to_string_pretty(&output).context("failed serialising output")?);
    if let Some(path) = &cli.out {
        write_json_atomic(path, &with_timestamp(output))?;
        info!(path = %path.display(), "output written");
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose == 0 {
        EnvFilter::new("off")
    } else {
        let level = match verbose {
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        };
        EnvFilter::new(format!("lsp6={level}"))
    };
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn permissions(names: &[String]) -> Result<Value> {
    let mut set = PermissionSet::NONE;
    for name in names {
        let name = name.trim();
        set |= PermissionSet::from_name(name).ok_or_else(|| anyhow!("unknown permission `{name}`"))?;
    }
    Ok(json!({
        "permissions": set.names().collect::<Vec<_>>(),
        "value": set.to_word().to_string(),
    }))
}

fn parse_allowed_call(re: &Regex, entry: &str) -> Result<AllowedCall> {
    let caps = re
        .captures(entry)
        .ok_or_else(|| anyhow!("malformed allowed call `{entry}`"))?;

    let mut call_types = CallTypes::empty();
    for name in caps["types"].split('|') {
        call_types |= CallTypes::from_name(name)
            .ok_or_else(|| anyhow!("unknown call type `{name}` in `{entry}`"))?;
    }
    let address = match &caps["address"] {
        "*" => ANY_ADDRESS,
        a => Address::from_str(a).with_context(|| format!("bad address in `{entry}`"))?,
    };
    let standard = match &caps["standard"] {
        "*" => ANY_STANDARD,
        s => FixedBytes::<4>::from_str(s).with_context(|| format!("bad standard in `{entry}`"))?,
    };
    let function = match &caps["function"] {
        "*" => ANY_FUNCTION,
        f => FixedBytes::<4>::from_str(f).with_context(|| format!("bad selector in `{entry}`"))?,
    };

    let call = AllowedCall::new(call_types, address, standard, function);
    if call.is_unrestricted() {
        bail!("`{entry}` allows every address, standard and function; the key manager rejects it");
    }
    Ok(call)
}

fn allowed_calls(entries: &[String]) -> Result<Value> {
    let re = Regex::new(
        r"^(?P<types>[A-Z]+(?:\|[A-Z]+)*):(?P<address>0x[0-9a-fA-F]{40}|\*):(?P<standard>0x[0-9a-fA-F]{8}|\*):(?P<function>0x[0-9a-fA-F]{8}|\*)$",
    )?;
    let calls = entries
        .iter()
        .map(|entry| parse_allowed_call(&re, entry))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = calls.len(), "allowed calls parsed");
    Ok(json!({ "value": format!("0x{}", hex::encode(encode_allowed_calls(&calls))) }))
}

fn allowed_data_keys(prefixes: &[String]) -> Result<Value> {
    let keys = prefixes
        .iter()
        .map(|p| {
            let bytes = decode_hex(p)?;
            AllowedDataKey::new(bytes).map_err(|e| anyhow!("bad data key prefix `{p}`: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let encoded = encode_allowed_data_keys(&keys).map_err(|e| anyhow!("encoding failed: {e}"))?;
    Ok(json!({ "value": format!("0x{}", hex::encode(encoded)) }))
}

fn data_keys(controller: Address, index: Option<u128>) -> Value {
    let mut out = json!({
        "permissions": permissions_key(controller).to_string(),
        "allowedCalls": allowed_calls_key(controller).to_string(),
        "allowedERC725YDataKeys": allowed_data_keys_key(controller).to_string(),
    });
    if let Some(index) = index {
        out["addressPermissionsIndex"] = json!(permissions_array_element_key(index).to_string());
    }
    out
}

fn relay(args: &RelayArgs) -> Result<Value> {
    let key_bytes = decode_hex(&args.private_key).context("private key is not hex")?;
    let signing_key = SigningKey::from_slice(&key_bytes).context("invalid private key")?;

    let start = args.valid_from.as_deref().map(unix_seconds).transpose()?.unwrap_or(0);
    let end = args.valid_until.as_deref().map(unix_seconds).transpose()?.unwrap_or(0);
    if end != 0 && end < start {
        bail!("--valid-until is before --valid-from");
    }

    let call = RelayCall {
        chain_id: args.chain_id,
        account: args.account,
        nonce: nonce_word(args.channel, args.sequence),
        validity_timestamps: validity_window(start, end),
        value: args.value,
        payload: decode_hex(&args.payload).context("payload is not hex")?,
    };
    let digest = relay_digest(&call);
    let signed = sign_relay_call(call, &signing_key).map_err(|e| anyhow!("signing failed: {e}"))?;
    debug!(%digest, "relay call signed");

    let output = SignedRelayOutput {
        signer: signer_address(&signing_key),
        digest,
        nonce: signed.call.nonce,
        validity_timestamps: signed.call.validity_timestamps,
        signature: format!("0x{}", hex::encode(&signed.signature)),
        calldata: format!("0x{}", hex::encode(execute_relay_call_calldata(&signed))),
    };
    serde_json::to_value(output).context("failed serialising relay output")
}

fn unix_seconds(rfc3339: &str) -> Result<u128> {
    let at = OffsetDateTime::parse(rfc3339, &Rfc3339)
        .with_context(|| format!("`{rfc3339}` is not an RFC 3339 time"))?;
    u128::try_from(at.unix_timestamp()).map_err(|_| anyhow!("`{rfc3339}` is before 1970"))
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}

fn with_timestamp(mut output: Value) -> Value {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());
    if let Some(obj) = output.as_object_mut() {
        obj.insert("generated_at".into(), json!(now));
    }
    output
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised = serde_json::to_string_pretty(value).context("failed serialising output")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_permission_names() {
        let out = permissions(&["call".into(), "TRANSFERVALUE".into()]).unwrap();
        assert_eq!(out["permissions"], json!(["TRANSFERVALUE", "CALL"]));
        assert!(permissions(&["NOPE".into()]).is_err());
    }

    #[test]
    fn parses_allowed_call_entries() {
        let out = allowed_calls(&[
            "CALL|VALUE:0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa:*:0xa9059cbb".into(),
        ])
        .unwrap();
        assert_eq!(
            out["value"],
            json!("0x002000000003aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaffffffffa9059cbb")
        );
        assert!(allowed_calls(&["CALL:*:*:*".into()]).is_err());
        assert!(allowed_calls(&["JUMP:*:*:0x12345678".into()]).is_err());
    }

    #[test]
    fn rfc3339_to_unix() {
        assert_eq!(unix_seconds("1970-01-01T00:01:40Z").unwrap(), 100);
        assert!(unix_seconds("yesterday").is_err());
    }
}
