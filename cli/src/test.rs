#[cfg(test)]
mod tests {
    use super::super::{
        decrypt_file, encrypt_file,
        options::{Command, DecryptOptions, EncryptOptions, FileOptions, Main, VaultOptions},
        rewrap_file, take_token, Error, DEFAULT_OUTPUT_FILE,
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use clap::{error::ErrorKind, Parser};
    use gruntr::{
        integrity::sha3_digest, properties::PropertySet, HOST_KEY, SHA3_KEY, TRANSIT_KEY_KEY,
        TRANSIT_PATH_KEY,
    };
    use gruntr_test_util::{random_text, StubVault};
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const MOUNT: &str = "transit";
    const KEY: &str = "appkey";
    const TOKEN: &str = "root";

    fn vault_options(stub: &StubVault) -> VaultOptions {
        VaultOptions {
            token: Some(TOKEN.to_string()),
            server: Some(stub.uri()),
            transit_path: Some(MOUNT.to_string()),
            transit_key: Some(KEY.to_string()),
        }
    }

    fn token_only() -> VaultOptions {
        VaultOptions {
            token: Some(TOKEN.to_string()),
            ..Default::default()
        }
    }

    fn files(input: &Path, output: &Path) -> FileOptions {
        FileOptions {
            input: input.to_path_buf(),
            output: Some(output.to_path_buf()),
        }
    }

    async fn write_input(text: &str) -> Result<mktemp::Temp, Error> {
        let file = mktemp::Temp::new_file()?;
        tokio::fs::write(file.as_path(), text).await?;
        Ok(file)
    }

    fn sample_text() -> String {
        format!(
            "# service settings\n\
             app.name = billing\n\
             db.user: admin\n\
             db.password={}\n\
             api.token = {}\n",
            random_text(20),
            random_text(32)
        )
    }

    fn is_lib_error(e: &Error, check: fn(&gruntr::error::Error) -> bool) -> bool {
        matches!(e, Error::LibError(inner) if check(inner))
    }

    #[tokio::test]
    async fn encrypt_decrypt_rewrap() -> Result<(), Error> {
        let stub = StubVault::start(MOUNT, KEY, TOKEN).await;
        let text = sample_text();
        let plain_file = write_input(&text).await?;
        let cipher_file = mktemp::Temp::new_file()?;

        encrypt_file(EncryptOptions {
            files: files(plain_file.as_path(), cipher_file.as_path()),
            vault: vault_options(&stub),
            keys: Some(":secrets".to_string()),
            help: None,
        })
        .await?;
        // two secrets and the digest
        assert_eq!(stub.requests_for("encrypt").await, 3);

        let encrypted = PropertySet::read_file(cipher_file.as_path()).await?;
        assert_eq!(encrypted.len(), 8);
        assert_eq!(encrypted.get("app.name"), Some("billing"));
        assert_eq!(encrypted.get("db.user"), Some("admin"));
        assert!(encrypted.get("db.password").unwrap_or("").starts_with("vault:v1:"));
        assert!(encrypted.get("api.token").unwrap_or("").starts_with("vault:v1:"));
        assert_eq!(encrypted.get(HOST_KEY), Some(stub.uri().as_str()));
        assert_eq!(encrypted.get(TRANSIT_PATH_KEY), Some(MOUNT));
        assert_eq!(encrypted.get(TRANSIT_KEY_KEY), Some(KEY));

        // decrypt with the token only: coordinates come from the file
        let final_file = mktemp::Temp::new_file()?;
        decrypt_file(DecryptOptions {
            files: files(cipher_file.as_path(), final_file.as_path()),
            vault: token_only(),
            help: None,
        })
        .await?;
        let expected = gruntr::util::format::parse_properties(&text)?;
        assert_eq!(PropertySet::read_file(final_file.as_path()).await?, expected);

        let rewrapped_file = mktemp::Temp::new_file()?;
        rewrap_file(DecryptOptions {
            files: files(cipher_file.as_path(), rewrapped_file.as_path()),
            vault: token_only(),
            help: None,
        })
        .await?;
        let rewrapped = PropertySet::read_file(rewrapped_file.as_path()).await?;
        assert_eq!(stub.requests_for("rewrap").await, 2);
        assert!(rewrapped.get("api.token").unwrap_or("").starts_with("vault:v2:"));
        assert_eq!(rewrapped.get(SHA3_KEY), encrypted.get(SHA3_KEY));
        assert_eq!(rewrapped.get("db.user"), Some("admin"));
        Ok(())
    }

    #[tokio::test]
    async fn output_directory() -> Result<(), Error> {
        let stub = StubVault::start(MOUNT, KEY, TOKEN).await;
        let plain_file = write_input("password=hunter2\n").await?;
        let out_dir = mktemp::Temp::new_dir()?;

        encrypt_file(EncryptOptions {
            files: files(plain_file.as_path(), out_dir.as_path()),
            vault: vault_options(&stub),
            keys: None,
            help: None,
        })
        .await?;

        let written: PathBuf = out_dir.as_path().join(DEFAULT_OUTPUT_FILE);
        let encrypted = PropertySet::read_file(&written).await?;
        assert_eq!(encrypted.len(), 5);
        assert!(encrypted.get("password").unwrap_or("").starts_with("vault:"));
        Ok(())
    }

    #[tokio::test]
    async fn tampered_file_is_rejected() -> Result<(), Error> {
        let stub = StubVault::start(MOUNT, KEY, TOKEN).await;
        let plain_file = write_input(&sample_text()).await?;
        let cipher_file = mktemp::Temp::new_file()?;
        encrypt_file(EncryptOptions {
            files: files(plain_file.as_path(), cipher_file.as_path()),
            vault: vault_options(&stub),
            keys: None,
            help: None,
        })
        .await?;

        // same server after normalisation, but a different recorded value
        let mut encrypted = PropertySet::read_file(cipher_file.as_path()).await?;
        encrypted.put(HOST_KEY, format!("{}/", stub.uri()));
        encrypted.write_file(cipher_file.as_path()).await?;

        let out = mktemp::Temp::new_file()?;
        let e = decrypt_file(DecryptOptions {
            files: files(cipher_file.as_path(), out.as_path()),
            vault: token_only(),
            help: None,
        })
        .await
        .unwrap_err();
        assert!(is_lib_error(&e, gruntr::error::Error::is_tamper), "{:?}", e);
        assert!(e.to_string().starts_with("Tamper detected:"));
        Ok(())
    }

    /// Server that answers the digest decrypt with a digest of its own coordinates
    async fn impostor() -> MockServer {
        let server = MockServer::start().await;
        let uri = server.uri();
        let digest = sha3_digest(&[uri.as_str(), MOUNT, KEY]).expect("digest");
        Mock::given(method("POST"))
            .and(path(format!("/v1/{}/decrypt/{}", MOUNT, KEY)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "plaintext": STANDARD.encode(digest) }
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn swapped_host_with_given_server_is_rejected() -> Result<(), Error> {
        let stub = StubVault::start(MOUNT, KEY, TOKEN).await;
        let impostor = impostor().await;
        let plain_file = write_input(&sample_text()).await?;
        let cipher_file = mktemp::Temp::new_file()?;
        encrypt_file(EncryptOptions {
            files: files(plain_file.as_path(), cipher_file.as_path()),
            vault: vault_options(&stub),
            keys: None,
            help: None,
        })
        .await?;
        let before = stub.request_count().await;

        let mut encrypted = PropertySet::read_file(cipher_file.as_path()).await?;
        encrypted.put(HOST_KEY, impostor.uri());
        encrypted.write_file(cipher_file.as_path()).await?;

        let out = mktemp::Temp::new_file()?;
        let e = decrypt_file(DecryptOptions {
            files: files(cipher_file.as_path(), out.as_path()),
            vault: vault_options(&stub),
            help: None,
        })
        .await
        .unwrap_err();
        assert!(is_lib_error(&e, gruntr::error::Error::is_tamper), "{:?}", e);

        let e = rewrap_file(DecryptOptions {
            files: files(cipher_file.as_path(), out.as_path()),
            vault: VaultOptions {
                token: Some(TOKEN.to_string()),
                server: Some(format!("{}/", stub.uri())),
                ..Default::default()
            },
            help: None,
        })
        .await
        .unwrap_err();
        assert!(is_lib_error(&e, gruntr::error::Error::is_tamper), "{:?}", e);

        // neither server saw the token
        let impostor_requests = impostor.received_requests().await.unwrap_or_default();
        assert_eq!(impostor_requests.len(), 0);
        assert_eq!(stub.request_count().await, before);
        Ok(())
    }

    #[tokio::test]
    async fn given_coordinates_matching_file_are_accepted() -> Result<(), Error> {
        let stub = StubVault::start(MOUNT, KEY, TOKEN).await;
        let plain_file = write_input(&sample_text()).await?;
        let cipher_file = mktemp::Temp::new_file()?;
        encrypt_file(EncryptOptions {
            files: files(plain_file.as_path(), cipher_file.as_path()),
            vault: vault_options(&stub),
            keys: None,
            help: None,
        })
        .await?;

        let mut vault = vault_options(&stub);
        vault.server = Some(format!("{}/", stub.uri()));
        let out = mktemp::Temp::new_file()?;
        decrypt_file(DecryptOptions {
            files: files(cipher_file.as_path(), out.as_path()),
            vault,
            help: None,
        })
        .await?;
        let decrypted = PropertySet::read_file(out.as_path()).await?;
        assert_eq!(decrypted.get("app.name"), Some("billing"));
        Ok(())
    }

    #[test]
    fn token_is_taken_from_options() {
        let mut vault = token_only();
        let token = take_token(&mut vault);
        assert_eq!(token.expose_secret(), TOKEN);
        assert!(vault.token.is_none());

        let token = take_token(&mut vault);
        assert!(token.is_invalidated());
    }

    #[tokio::test]
    async fn missing_coordinates_fail_before_any_request() -> Result<(), Error> {
        let stub = StubVault::start(MOUNT, KEY, TOKEN).await;
        let plain_file = write_input("password=hunter2\n").await?;
        let out = mktemp::Temp::new_file()?;

        let mut vault = vault_options(&stub);
        vault.transit_key = None;
        let e = encrypt_file(EncryptOptions {
            files: files(plain_file.as_path(), out.as_path()),
            vault,
            keys: None,
            help: None,
        })
        .await
        .unwrap_err();
        assert!(is_lib_error(&e, gruntr::error::Error::is_configuration), "{:?}", e);
        assert!(e.to_string().contains("--hc-transit-key"));

        let mut vault = vault_options(&stub);
        vault.token = Some(String::new());
        let e = encrypt_file(EncryptOptions {
            files: files(plain_file.as_path(), out.as_path()),
            vault,
            keys: None,
            help: None,
        })
        .await
        .unwrap_err();
        assert!(is_lib_error(&e, gruntr::error::Error::is_configuration), "{:?}", e);

        // plaintext file has no recorded coordinates
        let e = decrypt_file(DecryptOptions {
            files: files(plain_file.as_path(), out.as_path()),
            vault: token_only(),
            help: None,
        })
        .await
        .unwrap_err();
        assert!(is_lib_error(&e, gruntr::error::Error::is_configuration), "{:?}", e);

        assert_eq!(stub.request_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_input_is_io_error() {
        let out = mktemp::Temp::new_file().expect("temp file");
        let e = decrypt_file(DecryptOptions {
            files: files(Path::new("/nonexistent/gruntr/input.properties"), out.as_path()),
            vault: token_only(),
            help: None,
        })
        .await
        .unwrap_err();
        assert!(matches!(e, Error::LibError(gruntr::error::Error::IOError(_))), "{:?}", e);
    }

    #[test]
    fn parse_encrypt_args() {
        let args = Main::try_parse_from([
            "gruntr",
            "-v",
            "encrypt",
            "-i",
            "app.properties",
            "-h",
            "http://127.0.0.1:8200",
            "--token",
            "root",
            "--hc-transit-path",
            "transit",
            "--hc-transit-key",
            "appkey",
            "-k",
            ":secrets,api",
        ])
        .expect("valid args");
        assert_eq!(args.verbose, 1);
        match args.command {
            Command::Encrypt(opt) => {
                assert_eq!(opt.files.input, PathBuf::from("app.properties"));
                assert_eq!(opt.files.output, None);
                assert_eq!(opt.vault.server.as_deref(), Some("http://127.0.0.1:8200"));
                assert_eq!(opt.vault.token.as_deref(), Some("root"));
                assert_eq!(opt.vault.transit_path.as_deref(), Some("transit"));
                assert_eq!(opt.vault.transit_key.as_deref(), Some("appkey"));
                assert_eq!(opt.keys.as_deref(), Some(":secrets,api"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parse_rewrap_args() {
        let args = Main::try_parse_from([
            "gruntr", "rewrap", "-i", "in", "-o", "out", "-t", "root", "-vv",
        ])
        .expect("valid args");
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Rewrap(opt) => {
                assert_eq!(opt.files.output, Some(PathBuf::from("out")));
                assert_eq!(opt.vault.token.as_deref(), Some("root"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn long_help_only() {
        let e = Main::try_parse_from(["gruntr", "decrypt", "--help"]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::DisplayHelp);

        // keys are an encrypt-only option
        let e = Main::try_parse_from(["gruntr", "decrypt", "-i", "in", "-k", "x"]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::UnknownArgument);
    }
}
