use crunch_core::config::{Config, StringEncoding, MAX_PAD, PAGE_SIZES};
use crunch_core::error::CrunchError;

fn valid() -> Config {
    Config::builder().name("atlas").input("assets").build()
}

#[test]
fn defaults_match_the_documented_option_table() {
    let cfg = Config::default();
    assert_eq!(cfg.size, 4096);
    assert_eq!(cfg.pad, 1);
    assert_eq!(cfg.binstr, StringEncoding::NullTerminated);
    assert!(!cfg.xml && !cfg.binary && !cfg.json);
    assert!(!cfg.premultiply && !cfg.trim && !cfg.unique && !cfg.rotate);
    assert!(!cfg.force && !cfg.verbose && !cfg.split && !cfg.nozero);
    assert!(!cfg.check_time);
}

#[test]
fn every_listed_page_size_validates() {
    for size in PAGE_SIZES {
        let cfg = Config {
            size,
            ..valid()
        };
        cfg.validate().unwrap();
    }
}

#[test]
fn off_list_page_sizes_are_rejected() {
    for size in [0, 63, 100, 1000, 8192] {
        let cfg = Config {
            size,
            ..valid()
        };
        assert!(matches!(cfg.validate(), Err(CrunchError::InvalidConfig(_))), "size {size}");
    }
}

#[test]
fn pad_range_is_zero_to_sixteen() {
    for pad in 0..=MAX_PAD {
        Config { pad, ..valid() }.validate().unwrap();
    }
    assert!(Config {
        pad: MAX_PAD + 1,
        ..valid()
    }
    .validate()
    .is_err());
}

#[test]
fn name_and_inputs_are_required() {
    let cfg = Config {
        name: String::new(),
        ..valid()
    };
    assert!(cfg.validate().is_err());

    let cfg = Config {
        inputs: Vec::new(),
        ..valid()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn string_encoding_parses_cli_spellings() {
    assert_eq!("n".parse(), Ok(StringEncoding::NullTerminated));
    assert_eq!("p".parse(), Ok(StringEncoding::LengthPrefixed));
    assert_eq!("7".parse(), Ok(StringEncoding::SevenBitPrefixed));
    assert_eq!("null".parse(), Ok(StringEncoding::NullTerminated));
    assert_eq!("7bit".parse(), Ok(StringEncoding::SevenBitPrefixed));
    assert!("x".parse::<StringEncoding>().is_err());
}

#[test]
fn string_encoding_wire_ids_are_stable() {
    assert_eq!(StringEncoding::NullTerminated.wire_id(), 0);
    assert_eq!(StringEncoding::LengthPrefixed.wire_id(), 1);
    assert_eq!(StringEncoding::SevenBitPrefixed.wire_id(), 2);
}

#[test]
fn builder_sets_every_field_it_names() {
    let cfg = Config::builder()
        .out_dir("out")
        .name("n")
        .input("a")
        .input("b.png")
        .xml(true)
        .binary(true)
        .json(true)
        .premultiply(true)
        .trim(true)
        .verbose(true)
        .force(true)
        .unique(true)
        .rotate(true)
        .size(256)
        .pad(4)
        .binstr(StringEncoding::SevenBitPrefixed)
        .check_time(true)
        .split(true)
        .nozero(true)
        .args(vec!["tok".into()])
        .build();
    assert_eq!(cfg.inputs.len(), 2);
    assert!(cfg.xml && cfg.binary && cfg.json);
    assert!(cfg.premultiply && cfg.trim && cfg.unique && cfg.rotate);
    assert!(cfg.verbose && cfg.force && cfg.check_time && cfg.split && cfg.nozero);
    assert_eq!(cfg.size, 256);
    assert_eq!(cfg.pad, 4);
    assert_eq!(cfg.binstr, StringEncoding::SevenBitPrefixed);
    assert_eq!(cfg.args, vec!["tok".to_string()]);
    cfg.validate().unwrap();
}
