//! BIP32 Integration Tests
//!
//! ## Test Categories
//!
//! 1. **Golden Tests** - Published BIP32 vectors 1-3
//! 2. **Determinism** - Same seed, same tree
//! 3. **Public Derivation** - xpub children equal neutered xprv children
//! 4. **Cross-Check** - Agreement with `bitcoin::bip32` on random paths
//! 5. **Hierarchy** - Memoization, paths, concurrency
//! 6. **Error Handling** - Each error kind where it belongs

use btc_hdkeys::{derive_root, DerivationPath, ExtendedKey, KeyError, KeyHierarchy, NetParams};
use once_cell::sync::Lazy;

const H: u32 = 0x8000_0000;

/// (seed hex, [(wire child number, xprv, xpub)]), root first with child number 0.
struct Vector {
    seed: &'static str,
    chain: &'static [(u32, &'static str, &'static str)],
}

static VECTORS: Lazy<Vec<Vector>> = Lazy::new(|| {
    vec![
        Vector {
            seed: "000102030405060708090a0b0c0d0e0f",
            chain: &[
                (0, "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi",
                    "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"),
                (H, "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7",
                    "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw"),
                (1, "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs",
                    "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ"),
                (H + 2, "xprv9z4pot5VBttmtdRTWfWQmoH1taj2axGVzFqSb8C9xaxKymcFzXBDptWmT7FwuEzG3ryjH4ktypQSAewRiNMjANTtpgP4mLTj34bhnZX7UiM",
                    "xpub6D4BDPcP2GT577Vvch3R8wDkScZWzQzMMUm3PWbmWvVJrZwQY4VUNgqFJPMM3No2dFDFGTsxxpG5uJh7n7epu4trkrX7x7DogT5Uv6fcLW5"),
                (2, "xprvA2JDeKCSNNZky6uBCviVfJSKyQ1mDYahRjijr5idH2WwLsEd4Hsb2Tyh8RfQMuPh7f7RtyzTtdrbdqqsunu5Mm3wDvUAKRHSC34sJ7in334",
                    "xpub6FHa3pjLCk84BayeJxFW2SP4XRrFd1JYnxeLeU8EqN3vDfZmbqBqaGJAyiLjTAwm6ZLRQUMv1ZACTj37sR62cfN7fe5JnJ7dh8zL4fiyLHV"),
                (1_000_000_000, "xprvA41z7zogVVwxVSgdKUHDy1SKmdb533PjDz7J6N6mV6uS3ze1ai8FHa8kmHScGpWmj4WggLyQjgPie1rFSruoUihUZREPSL39UNdE3BBDu76",
                    "xpub6H1LXWLaKsWFhvm6RVpEL9P4KfRZSW7abD2ttkWP3SSQvnyA8FSVqNTEcYFgJS2UaFcxupHiYkro49S8yGasTvXEYBVPamhGW6cFJodrTHy"),
            ],
        },
        Vector {
            seed: "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a29f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542",
            chain: &[
                (0, "xprv9s21ZrQH143K31xYSDQpPDxsXRTUcvj2iNHm5NUtrGiGG5e2DtALGdso3pGz6ssrdK4PFmM8NSpSBHNqPqm55Qn3LqFtT2emdEXVYsCzC2U",
                    "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB"),
                (0, "xprv9vHkqa6EV4sPZHYqZznhT2NPtPCjKuDKGY38FBWLvgaDx45zo9WQRUT3dKYnjwih2yJD9mkrocEZXo1ex8G81dwSM1fwqWpWkeS3v86pgKt",
                    "xpub69H7F5d8KSRgmmdJg2KhpAK8SR3DjMwAdkxj3ZuxV27CprR9LgpeyGmXUbC6wb7ERfvrnKZjXoUmmDznezpbZb7ap6r1D3tgFxHmwMkQTPH"),
                (H + 2_147_483_647, "xprv9wSp6B7kry3Vj9m1zSnLvN3xH8RdsPP1Mh7fAaR7aRLcQMKTR2vidYEeEg2mUCTAwCd6vnxVrcjfy2kRgVsFawNzmjuHc2YmYRmagcEPdU9",
                    "xpub6ASAVgeehLbnwdqV6UKMHVzgqAG8Gr6riv3Fxxpj8ksbH9ebxaEyBLZ85ySDhKiLDBrQSARLq1uNRts8RuJiHjaDMBU4Zn9h8LZNnBC5y4a"),
                (1, "xprv9zFnWC6h2cLgpmSA46vutJzBcfJ8yaJGg8cX1e5StJh45BBciYTRXSd25UEPVuesF9yog62tGAQtHjXajPPdbRCHuWS6T8XA2ECKADdw4Ef",
                    "xpub6DF8uhdarytz3FWdA8TvFSvvAh8dP3283MY7p2V4SeE2wyWmG5mg5EwVvmdMVCQcoNJxGoWaU9DCWh89LojfZ537wTfunKau47EL2dhHKon"),
                (H + 2_147_483_646, "xprvA1RpRA33e1JQ7ifknakTFpgNXPmW2YvmhqLQYMmrj4xJXXWYpDPS3xz7iAxn8L39njGVyuoseXzU6rcxFLJ8HFsTjSyQbLYnMpCqE2VbFWc",
                    "xpub6ERApfZwUNrhLCkDtcHTcxd75RbzS1ed54G1LkBUHQVHQKqhMkhgbmJbZRkrgZw4koxb5JaHWkY4ALHY2grBGRjaDMzQLcgJvLJuZZvRcEL"),
                (2, "xprvA2nrNbFZABcdryreWet9Ea4LvTJcGsqrMzxHx98MMrotbir7yrKCEXw7nadnHM8Dq38EGfSh6dqA9QWTyefMLEcBYJUuekgW4BYPJcr9E7j",
                    "xpub6FnCn6nSzZAw5Tw7cgR9bi15UV96gLZhjDstkXXxvCLsUXBGXPdSnLFbdpq8p9HmGsApME5hQTZ3emM2rnY5agb9rXpVGyy3bdW6EEgAtqt"),
            ],
        },
        // Leading zeros in the private key (retained on serialization)
        Vector {
            seed: "4b381541583be4423346c643850da4b320e46a87ae3d2a4e6da11eba819cd4acba45d239319ac14f863b8d5ab5a0d0c64d2e8a1e7d1457df2e5a3c51c73235be",
            chain: &[
                (0, "xprv9s21ZrQH143K25QhxbucbDDuQ4naNntJRi4KUfWT7xo4EKsHt2QJDu7KXp1A3u7Bi1j8ph3EGsZ9Xvz9dGuVrtHHs7pXeTzjuxBrCmmhgC6",
                    "xpub661MyMwAqRbcEZVB4dScxMAdx6d4nFc9nvyvH3v4gJL378CSRZiYmhRoP7mBy6gSPSCYk6SzXPTf3ND1cZAceL7SfJ1Z3GC8vBgp2epUt13"),
                (H, "xprv9uPDJpEQgRQfDcW7BkF7eTya6RPxXeJCqCJGHuCJ4GiRVLzkTXBAJMu2qaMWPrS7AANYqdq6vcBcBUdJCVVFceUvJFjaPdGZ2y9WACViL4L",
                    "xpub68NZiKmJWnxxS6aaHmn81bvJeTESw724CRDs6HbuccFQN9Ku14VQrADWgqbhhTHBaohPX4CjNLf9fq9MYo6oDaPPLPxSb7gwQN3ih19Zm4Y"),
            ],
        },
    ]
});

fn seed(hex_seed: &str) -> Vec<u8> {
    hex::decode(hex_seed).expect("hex seed")
}

fn step(parent: &ExtendedKey, wire: u32) -> ExtendedKey {
    parent.derive_child(wire & !H, wire & H != 0).expect("derivation")
}

// ============================================================================
// 1. GOLDEN TESTS - Published Vectors
// ============================================================================

mod golden_tests {
    use super::*;

    #[test]
    fn golden_private_chains() {
        for vector in VECTORS.iter() {
            let mut key = derive_root(&seed(vector.seed), &NetParams::mainnet()).expect("root");
            for (i, (wire, xprv, xpub)) in vector.chain.iter().enumerate() {
                if i > 0 {
                    key = step(&key, *wire);
                }
                assert_eq!(&key.to_base58(), xprv, "xprv mismatch at depth {i} of seed {}", vector.seed);
                assert_eq!(&key.to_public().to_base58(), xpub, "xpub mismatch at depth {i}");
                assert_eq!(key.depth() as usize, i);
            }
        }
    }

    #[test]
    fn golden_strings_parse_back() {
        let params = NetParams::mainnet();
        for vector in VECTORS.iter() {
            for (wire, xprv, xpub) in vector.chain {
                let private = ExtendedKey::from_base58(xprv, &params).expect("xprv");
                let public = ExtendedKey::from_base58(xpub, &params).expect("xpub");
                assert_eq!(private.child_number().to_u32(), *wire);
                assert_eq!(private.to_public(), public);
                assert_eq!(&private.to_string(), xprv);
                assert_eq!(&public.to_string(), xpub);
            }
        }
    }

    #[test]
    fn golden_root_fingerprint_and_address() {
        let root = derive_root(&seed(VECTORS[0].seed), &NetParams::mainnet()).expect("root");
        assert_eq!(hex::encode(root.fingerprint()), "3442193e");

        let child = step(&root, H);
        assert_eq!(child.parent_fingerprint(), root.fingerprint());
        assert_eq!(child.to_address().to_string(), "19Q2WoS5hSS6T8GjhK8KZLMgmWaq4neXrh");
    }

    #[cfg(feature = "mnemonic")]
    #[test]
    fn golden_bip44_first_address() {
        const PHRASE: &str =
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let tree = KeyHierarchy::from_mnemonic(PHRASE, "", &NetParams::mainnet()).expect("mnemonic");
        let path: DerivationPath = "m/44'/0'/0'/0/0".parse().expect("path");
        let node = tree.derive_path(&path).expect("derive");
        assert_eq!(node.key().to_address().to_string(), "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
    }
}

// ============================================================================
// 2. DETERMINISM TESTS - Reproducibility
// ============================================================================

mod determinism_tests {
    use super::*;

    #[test]
    fn root_is_deterministic() {
        let roots: Vec<_> = (0..5)
            .map(|_| derive_root(&seed(VECTORS[1].seed), &NetParams::mainnet()).expect("root"))
            .collect();
        for root in &roots[1..] {
            assert_eq!(&roots[0], root);
        }
    }

    #[test]
    fn child_is_deterministic() {
        let root = derive_root(&[0x5a; 64], &NetParams::mainnet()).expect("root");
        for index in [0, 1, 42, H - 1] {
            for hardened in [false, true] {
                let a = root.derive_child(index, hardened).expect("child");
                let b = root.derive_child(index, hardened).expect("child");
                assert_eq!(a, b);
                assert_eq!(a.to_base58(), b.to_base58());
            }
        }
    }

    #[test]
    fn network_changes_only_the_version() {
        let main = derive_root(&[9; 32], &NetParams::mainnet()).expect("root");
        let test = derive_root(&[9; 32], &NetParams::testnet()).expect("root");
        assert!(main.to_base58().starts_with("xprv"));
        assert!(test.to_base58().starts_with("tprv"));
        assert!(test.to_public().to_base58().starts_with("tpub"));
        assert_eq!(main.chain_code(), test.chain_code());
        assert_eq!(main.serialize()[4..], test.serialize()[4..]);
    }
}

// ============================================================================
// 3. PUBLIC DERIVATION - xpub → child xpub
// ============================================================================

mod public_derivation_tests {
    use super::*;

    #[test]
    fn public_chain_matches_neutered_private_chain() {
        let root = derive_root(&seed(VECTORS[0].seed), &NetParams::mainnet()).expect("root");
        let account = step(&root, H);

        let mut private = account.clone();
        let mut public = account.to_public();
        for index in [1, 2, 1_000_000_000] {
            private = private.derive_child(index, false).expect("private child");
            public = public.derive_child(index, false).expect("public child");
            assert!(!public.has_private_key());
            assert_eq!(public, private.to_public());
        }
    }

    #[test]
    fn public_vector_step() {
        let params = NetParams::mainnet();
        let (_, _, parent_xpub) = VECTORS[0].chain[1];
        let (_, _, child_xpub) = VECTORS[0].chain[2];
        let parent = ExtendedKey::from_base58(parent_xpub, &params).expect("xpub");
        let child = parent.derive_child(1, false).expect("child");
        assert_eq!(child.to_base58(), child_xpub);
    }

    #[test]
    fn public_parent_cannot_harden() {
        let public = derive_root(&[1; 16], &NetParams::mainnet()).expect("root").to_public();
        assert_eq!(public.derive_child(0, true).unwrap_err(), KeyError::NoPrivateKey);
    }
}

// ============================================================================
// 4. CROSS-CHECK - Agreement with rust-bitcoin's bip32
// ============================================================================

mod cross_check_tests {
    use super::*;
    use bitcoin::bip32::{DerivationPath as OraclePath, Xpriv, Xpub};
    use bitcoin::secp256k1::Secp256k1;
    use std::str::FromStr;

    const PATHS: &[&str] = &["m/0", "m/0'/1", "m/44'/0'/0'/0/7", "m/84'/1'/3'/1/19", "m/2147483647'/2147483646"];

    #[test]
    fn matches_bitcoin_bip32() {
        let secp = Secp256k1::new();
        for fill in 0u8..6 {
            let seed = [fill.wrapping_mul(37).wrapping_add(1); 32];
            let tree = KeyHierarchy::from_seed(&seed, &NetParams::mainnet()).expect("tree");
            let master = Xpriv::new_master(bitcoin::Network::Bitcoin, &seed).expect("master");

            for path in PATHS {
                let ours = tree.derive_path(&path.parse().expect("path")).expect("derive");
                let oracle = master
                    .derive_priv(&secp, &OraclePath::from_str(path).expect("path"))
                    .expect("oracle");
                assert_eq!(ours.key().to_base58(), oracle.to_string(), "xprv at {path}");
                assert_eq!(
                    ours.key().to_public().to_base58(),
                    Xpub::from_priv(&secp, &oracle).to_string(),
                    "xpub at {path}"
                );
            }
        }
    }
}

// ============================================================================
// 5. HIERARCHY TESTS - Memoization and Paths
// ============================================================================

mod hierarchy_tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn same_request_same_node() {
        let tree = KeyHierarchy::from_seed(&seed(VECTORS[0].seed), &NetParams::mainnet()).expect("tree");
        let a = tree.root().derive_child_key(0, true).expect("0'");
        let b = tree.root().derive_child_key(0, true).expect("0'");
        assert!(Arc::ptr_eq(&a, &b));

        let (_, xprv, _) = VECTORS[0].chain[1];
        assert_eq!(a.key().to_base58(), xprv);
    }

    #[test]
    fn path_display() {
        let tree = KeyHierarchy::from_seed(&seed(VECTORS[0].seed), &NetParams::mainnet()).expect("tree");
        let node = tree.derive_path(&"m/0h/1/2'".parse().expect("path")).expect("derive");
        assert_eq!(node.path().to_string(), "m/0'/1/2'");
        assert_eq!(tree.root().path().to_string(), "m");

        let (_, xprv, _) = VECTORS[0].chain[3];
        assert_eq!(node.key().to_base58(), xprv);
    }

    #[test]
    fn concurrent_paths_converge() {
        let tree = KeyHierarchy::from_seed(&[0x33; 32], &NetParams::mainnet()).expect("tree");
        let path: DerivationPath = "m/44'/0'/0'/0/5".parse().expect("path");

        let nodes: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..16).map(|_| s.spawn(|| tree.derive_path(&path).expect("derive"))).collect();
            handles.into_iter().map(|h| h.join().expect("thread")).collect()
        });
        for node in &nodes {
            assert!(Arc::ptr_eq(&nodes[0], node));
        }
        assert_eq!(tree.root().cached_children(), 1);
    }

    #[test]
    fn tree_is_shareable_across_threads() {
        let tree = Arc::new(KeyHierarchy::from_seed(&[0x44; 32], &NetParams::testnet()).expect("tree"));
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let tree = Arc::clone(&tree);
                std::thread::spawn(move || tree.root().derive_child_key(i, i % 2 == 0).expect("child"))
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }
        assert_eq!(tree.root().cached_children(), 4);
    }
}

// ============================================================================
// 6. ERROR HANDLING - Correct Error Kinds
// ============================================================================

mod error_tests {
    use super::*;

    #[test]
    fn short_seed() {
        let err = derive_root(&[0u8; 15], &NetParams::mainnet()).unwrap_err();
        assert!(matches!(err, KeyError::InvalidKey(_)));
        assert!(!err.is_retryable());
        assert!(derive_root(&[0u8; 16], &NetParams::mainnet()).is_ok());
    }

    #[test]
    fn out_of_range_index() {
        let root = derive_root(&[2; 32], &NetParams::mainnet()).expect("root");
        assert!(matches!(root.derive_child(H, true), Err(KeyError::InvalidKey(_))));
        assert!(matches!(root.derive_child(u32::MAX, false), Err(KeyError::InvalidKey(_))));
    }

    #[test]
    fn retryable_error_is_distinguishable() {
        let err = KeyError::DerivationInvalid { index: Some(7), hardened: true };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Derivation invalid at index 7'; retry with the next index");
        for other in [
            KeyError::DerivationInvalid { index: None, hardened: false },
            KeyError::NoPrivateKey,
            KeyError::ChecksumMismatch,
            KeyError::InvalidKey("x".into()),
            KeyError::MalformedEncoding("x".into()),
        ] {
            assert!(!other.is_retryable());
        }
    }

    #[test]
    fn malformed_paths() {
        assert!("44'/0'".parse::<DerivationPath>().is_err());
        assert!("m/abc".parse::<DerivationPath>().is_err());
    }
}
