//! Stand-ins for the node: a stub REST endpoint and fake `lncli` scripts.

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use walletinit::InitConfig;
use walletinit_core::Network;
use warp::http::StatusCode;
use warp::Filter;

/// Password used by every test.
pub const PASSWORD: &str = "MySuperSecurePassword123!";

/// Self-signed certificate for `localhost`, `127.0.0.1` and `::1`.
pub const TLS_CERT: &str = include_str!("../fixtures/localhost-cert.pem");

const TLS_KEY: &str = include_str!("../fixtures/localhost-key.pem");

/// Path of [`TLS_CERT`] on disk, as an operator would pass the node's tls.cert.
pub fn tls_cert_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("localhost-cert.pem")
}

/// A stub `initwallet` endpoint answering every request the same way.
pub struct AdminStub {
    /// URL of the endpoint
    pub endpoint: String,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<serde_json::Value>>>,
}

impl AdminStub {
    /// Starts a plain HTTP stub on an ephemeral loopback port.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(status: u16, reply: &str) -> Self {
        Self::start(status, reply, false)
    }

    /// Starts an HTTPS stub serving the self-signed [`TLS_CERT`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_tls(status: u16, reply: &str) -> Self {
        Self::start(status, reply, true)
    }

    fn start(status: u16, reply: &str, tls: bool) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_body = Arc::new(Mutex::new(None));
        let status = StatusCode::from_u16(status).expect("valid status code");
        let reply = reply.to_string();

        let route = {
            let hits = hits.clone();
            let last_body = last_body.clone();
            warp::post()
                .and(warp::path!("v1" / "initwallet"))
                .and(warp::header::exact("content-type", "application/json"))
                .and(warp::body::json())
                .map(move |body: serde_json::Value| {
                    hits.fetch_add(1, Ordering::SeqCst);
                    *last_body.lock().unwrap() = Some(body);
                    warp::reply::with_status(reply.clone(), status)
                })
        };

        let endpoint = if tls {
            let (addr, server) = warp::serve(route)
                .tls()
                .cert(TLS_CERT)
                .key(TLS_KEY)
                .bind_ephemeral(([127, 0, 0, 1], 0));
            tokio::spawn(server);
            format!("https://{}/v1/initwallet", addr)
        } else {
            let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
            tokio::spawn(server);
            format!("http://{}/v1/initwallet", addr)
        };

        Self {
            endpoint,
            hits,
            last_body,
        }
    }

    /// Number of requests received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Body of the most recent request.
    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.last_body.lock().unwrap().clone()
    }
}

/// An endpoint on a loopback port nobody listens on.
pub fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/v1/initwallet", port)
}

/// A JSON success body carrying `count` recovery words.
pub fn mnemonic_reply(count: usize) -> String {
    let words: Vec<String> = (1..=count).map(|i| format!("seedword{}", i)).collect();
    serde_json::json!({ "cipher_seed_mnemonic": words }).to_string()
}

/// Configuration pointing at `endpoint`, writing into `dir`, with short
/// prompt deadlines and no extra search directories.
pub fn test_config(dir: &Path, endpoint: &str, lncli: &str) -> InitConfig {
    InitConfig {
        endpoint: endpoint.to_string(),
        network: Network::Testnet,
        output_dir: dir.join("out"),
        lncli_path: lncli.to_string(),
        extra_search_dirs: Vec::new(),
        request_timeout_secs: 5,
        prompt_timeout_secs: 2,
        completion_timeout_secs: 5,
        ..InitConfig::default()
    }
}

/// Writes an executable shell script named `name` into `dir`.
///
/// Every script appends its arguments to `invocations` next to itself first.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    {
        let mut file = std::fs::File::create(&path).expect("create script");
        writeln!(file, "#!/bin/sh").unwrap();
        writeln!(file, "echo \"$@\" >> \"$(dirname \"$0\")/invocations\"").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Lines recorded by scripts written with [`write_script`].
pub fn invocations(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("invocations"))
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// A script that walks through the `lncli create` prompts and prints a seed.
pub const LNCLI_CREATE_OK: &str = r#"
printf 'Input wallet password: '
read pw
printf '\nConfirm password: '
read pw2
[ "$pw" = "$pw2" ] || { echo "[lncli] passwords don't match" >&2; exit 4; }
printf '\n\nDo you have an existing cipher seed mnemonic or extended master root key you want to use?\n'
printf "Enter 'y' to use an existing cipher seed mnemonic, 'x' to use an extended master root key \nor 'n' to create a new seed (Enter y/x/n): "
read answer
[ "$answer" = "n" ] || exit 3
printf '\nYour cipher seed can optionally be encrypted.\n'
printf 'Input your passphrase if you wish to encrypt it (or press enter to proceed without a cipher seed passphrase): '
read pass
printf '\nConfirm passphrase: '
read pass2
printf '\n\nGenerating fresh cipher seed...\n\n'
printf '!!!YOU MUST WRITE DOWN THIS SEED TO BE ABLE TO RESTORE THE WALLET!!!\n\n'
printf '%s\n' '---------------BEGIN LND CIPHER SEED---------------'
printf ' 1. abandon    2. ability    3. able       4. about\n'
printf '%s\n' '---------------END LND CIPHER SEED-----------------'
printf '\nlnd successfully initialized!\n'
"#;

/// A script that refuses to create a wallet.
pub const LNCLI_CREATE_FAILS: &str = r#"
echo "[lncli] rpc error: code = Unknown desc = wallet already exists" >&2
exit 1
"#;

/// A script that, like the real client, refuses to read a password from
/// anything but a terminal.
pub const LNCLI_CREATE_NEEDS_TERMINAL: &str = r#"
[ -t 0 ] && [ -t 1 ] || { echo "[lncli] inappropriate ioctl for device" >&2; exit 1; }
printf 'Input wallet password: '
read pw
printf '\nConfirm password: '
read pw2
[ "$pw" = "$pw2" ] || { echo "[lncli] passwords don't match" >&2; exit 4; }
printf '\n\nDo you have an existing cipher seed mnemonic or extended master root key you want to use?\n'
printf "Enter 'y' to use an existing cipher seed mnemonic, 'x' to use an extended master root key \nor 'n' to create a new seed (Enter y/x/n): "
read answer
printf '\nYour cipher seed can optionally be encrypted.\n'
printf 'Input your passphrase if you wish to encrypt it (or press enter to proceed without a cipher seed passphrase): '
read pass
printf '\nConfirm passphrase: '
read pass2
printf '\n\n%s\n' '---------------BEGIN LND CIPHER SEED---------------'
printf ' 1. absorb     2. abstract\n'
printf '%s\n' '---------------END LND CIPHER SEED-----------------'
"#;

/// A script that prints the first prompt, complains on stderr and exits.
pub const LNCLI_CREATE_ABORTS: &str = r#"
printf 'Input wallet password: '
echo "[lncli] unable to read password: inappropriate ioctl for device" >&2
exit 1
"#;

/// A script that asks for the password once and then hangs.
pub const LNCLI_CREATE_HANGS: &str = r#"
printf 'Input wallet password: '
read pw
exec sleep 30
"#;
