use std::{ffi::OsString, fmt, str::FromStr};

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Signature},
    signers::{local::PrivateKeySigner, Signer},
};
use eyre::WrapErr;

use crate::constants::PRIVATE_KEY_ENV_PREFIX;

/// A signing identity. The key never leaves this struct and is never printed.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    network_wallet: EthereumWallet,
}

impl Wallet {
    pub fn from_private_key(private_key: &str) -> eyre::Result<Self> {
        let signer = PrivateKeySigner::from_str(private_key.trim())?;
        let network_wallet = EthereumWallet::new(signer.clone());

        Ok(Self {
            signer,
            network_wallet,
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn network_wallet(&self) -> &EthereumWallet {
        &self.network_wallet
    }

    /// EIP-191 personal message signature.
    pub async fn sign_message(&self, message: &str) -> Result<Signature, alloy::signers::Error> {
        self.signer.sign_message(message.as_bytes()).await
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// `PRIVATE_KEY_2` sorts before `PRIVATE_KEY_10`; non-numeric suffixes go last.
fn env_key_order(name: &str) -> (u64, &str) {
    let suffix = &name[PRIVATE_KEY_ENV_PREFIX.len()..];
    (suffix.parse().unwrap_or(u64::MAX), name)
}

pub fn read_private_keys_from(
    vars: impl IntoIterator<Item = (String, String)>,
) -> eyre::Result<Vec<Wallet>> {
    let mut entries: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(name, _)| name.starts_with(PRIVATE_KEY_ENV_PREFIX))
        .collect();

    if entries.is_empty() {
        eyre::bail!("No {PRIVATE_KEY_ENV_PREFIX}<n> entries found in the environment or .env file");
    }

    entries.sort_by(|(a, _), (b, _)| env_key_order(a).cmp(&env_key_order(b)));

    entries
        .iter()
        .map(|(name, private_key)| {
            Wallet::from_private_key(private_key)
                .wrap_err_with(|| format!("{name} does not hold a valid private key"))
        })
        .collect()
}

/// Keeps the `PRIVATE_KEY_*` entries of a raw environment. Unrelated variables may hold any bytes;
/// a key whose value is not UTF-8 is passed on empty so it fails as an invalid key.
pub fn prefixed_entries(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            name.starts_with(PRIVATE_KEY_ENV_PREFIX)
                .then(|| (name, value.into_string().unwrap_or_default()))
        })
        .collect()
}

pub fn read_private_keys() -> eyre::Result<Vec<Wallet>> {
    read_private_keys_from(prefixed_entries(std::env::vars_os()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // Anvil's first two dev accounts
    pub(crate) const TEST_PRIVATE_KEY_0: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    pub(crate) const TEST_PRIVATE_KEY_1: &str =
        "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn var(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn loads_keys_with_and_without_prefix() {
        let wallet = Wallet::from_private_key(&format!("0x{TEST_PRIVATE_KEY_0}")).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY_1).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn only_prefixed_entries_are_used_in_numeric_order() {
        let wallets = read_private_keys_from(vec![
            var("PRIVATE_KEY_10", TEST_PRIVATE_KEY_0),
            var("HOME", "/root"),
            var("PRIVATE_KEY_2", TEST_PRIVATE_KEY_1),
        ])
        .unwrap();

        assert_eq!(wallets.len(), 2);
        assert_eq!(
            wallets[0].address(),
            Wallet::from_private_key(TEST_PRIVATE_KEY_1).unwrap().address()
        );
        assert_eq!(
            wallets[1].address(),
            Wallet::from_private_key(TEST_PRIVATE_KEY_0).unwrap().address()
        );
    }

    #[test]
    fn no_keys_is_an_error() {
        let err = read_private_keys_from(vec![var("PATH", "/usr/bin")]).unwrap_err();
        assert!(err.to_string().contains("No PRIVATE_KEY_"));
    }

    #[test]
    fn invalid_key_names_the_variable_not_the_value() {
        let err = read_private_keys_from(vec![var("PRIVATE_KEY_1", "not-a-key")]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PRIVATE_KEY_1"));
        assert!(!message.contains("not-a-key"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_environment_entries_do_not_panic() {
        use std::os::unix::ffi::OsStringExt;

        let raw = |name: &str, value: Vec<u8>| (OsString::from(name), OsString::from_vec(value));

        let wallets = read_private_keys_from(prefixed_entries(vec![
            raw("PRIVATE_KEY_1", TEST_PRIVATE_KEY_0.as_bytes().to_vec()),
            raw("UNRELATED_BYTES", vec![0xff, 0xfe]),
            (OsString::from_vec(vec![0xff]), OsString::from("x")),
        ]))
        .unwrap();
        assert_eq!(wallets.len(), 1);

        let err = read_private_keys_from(prefixed_entries(vec![
            raw("PRIVATE_KEY_1", TEST_PRIVATE_KEY_0.as_bytes().to_vec()),
            raw("PRIVATE_KEY_2", vec![0xff, 0xfe]),
        ]))
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("PRIVATE_KEY_2 does not hold a valid private key"));
    }

    #[test]
    fn only_unrelated_variables_means_no_keys() {
        let entries = prefixed_entries(vec![(OsString::from("HOME"), OsString::from("/root"))]);
        assert!(entries.is_empty());
        assert!(read_private_keys_from(entries).is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY_0).unwrap();
        assert!(!format!("{wallet:?}").contains(TEST_PRIVATE_KEY_0));
    }

    #[tokio::test]
    async fn signature_recovers_to_wallet_address() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY_0).unwrap();
        let message = "Sign in to Novastro\nNonce: 42";

        let signature = wallet.sign_message(message).await.unwrap();

        assert_eq!(signature.as_bytes().len(), 65);
        assert_eq!(
            signature.recover_address_from_msg(message).unwrap(),
            wallet.address()
        );
    }
}
