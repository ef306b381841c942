use gerber_generator::board::Side;
use gerber_generator::testing::{logging_init, two_layer_board, BOTTOM, DIMENSION, SILKSCREEN_TOP, TOP};
use gerber_generator::{
    generate_components, generate_drill, generate_image, generate_job, generate_route, write_atomically, GeneratedFile,
    GeneratorConfig, GeneratorError, ImageKind,
};

fn fabrication_set(config: &GeneratorConfig) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let board = two_layer_board();
    let mut files = vec![];
    for layer in [TOP, BOTTOM, SILKSCREEN_TOP, DIMENSION] {
        files.push(generate_image(&board, ImageKind::Layer(layer), config)?);
    }
    for side in [Side::Top, Side::Bottom] {
        files.push(generate_image(&board, ImageKind::SolderMask(side), config)?);
    }
    files.push(generate_image(&board, ImageKind::Paste(Side::Top), config)?);
    files.push(generate_drill(&board, config)?);
    files.push(generate_route(&board, config)?);
    files.extend(generate_components(&board, config)?);

    let job = generate_job(&board, config, &files)?;
    files.push(job);
    Ok(files)
}

#[test]
fn test_write_fabrication_set() {
    // given
    logging_init();
    let config = GeneratorConfig {
        project_name: "demo".to_string(),
        ..GeneratorConfig::default()
    };
    let directory = tempfile::tempdir().unwrap();

    // when
    let files = fabrication_set(&config).unwrap();
    for file in &files {
        write_atomically(directory.path(), file).unwrap();
    }

    // then
    let mut names: Vec<String> = std::fs::read_dir(directory.path())
        .unwrap()
        .map(|entry| {
            entry
                .unwrap()
                .file_name()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    names.sort();
    assert_eq!(names, vec![
        "demo-bottom.gbr",
        "demo-component_top.gbr",
        "demo-dimension.gbr",
        "demo-drill.gbr",
        "demo-paste_top.gbr",
        "demo-route.gbr",
        "demo-soldermask_bottom.gbr",
        "demo-soldermask_top.gbr",
        "demo-top.gbr",
        "demo-tplace.gbr",
        "demo.gbrjob",
    ]);

    for file in files
        .iter()
        .filter(|file| file.name.ends_with(".gbr"))
    {
        let source = std::fs::read_to_string(directory.path().join(&file.name)).unwrap();
        assert!(source.starts_with("%MOMM*%"), "{}", file.name);
        assert!(source.trim_end().ends_with("M02*"), "{}", file.name);
    }
}

#[test]
fn test_regeneration_is_identical() {
    // given
    let config = GeneratorConfig::default();

    // when
    let first = fabrication_set(&config).unwrap();
    let second = fabrication_set(&config).unwrap();

    // then
    assert_eq!(first, second);
}

#[test]
fn test_inch_output() {
    // given
    let config = GeneratorConfig {
        unit: gerber_generator::OutputUnit::Inches,
        precision: 6,
        decimals: 4,
        ..GeneratorConfig::default()
    };

    // when
    let file = generate_route(&two_layer_board(), &config).unwrap();

    // then
    let source = String::from_utf8(file.content).unwrap();
    assert!(source.starts_with("%MOIN*%"));
    assert!(source.contains("%FSLAX24Y24*%"));
    // the 50mm board edge
    assert!(source.contains("X019685Y000000D01*"));
}
