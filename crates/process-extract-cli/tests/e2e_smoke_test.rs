use std::fs;

use tempfile::tempdir;

use process_extract_cli::{run, Args, CliError, Outcome};

const SNAPSHOT: &str = r#"{
    "elements": [
        {"id": "Process_1", "type": "bpmn:Process", "children": [
            {"id": "SP1", "type": "bpmn:SubProcess", "name": "Review", "children": [
                {"id": "t1", "type": "bpmn:Task", "name": "Task A", "outgoing": ["f1"]},
                {"id": "t2", "type": "bpmn:UserTask", "name": "Task B", "incoming": ["f1"]},
                {"id": "f1", "type": "bpmn:SequenceFlow", "sourceRef": {"id": "t1"}, "targetRef": "t2"}
            ]}
        ]}
    ],
    "registry": {
        "shapes": {
            "SP1": {"x": 400, "y": 400, "width": 500, "height": 300},
            "t1": {"x": 500, "y": 500, "width": 100, "height": 80},
            "t2": {"x": 700, "y": 500, "width": 100, "height": 80}
        },
        "connections": {
            "f1": [{"x": 600, "y": 540}, {"x": 700, "y": 540}]
        }
    }
}"#;

fn args(input: &str, container: &str) -> Args {
    Args {
        input: input.to_string(),
        container: container.to_string(),
        output: None,
        config: None,
        padding: None,
        layout_url: None,
        check: false,
        log_level: "off".to_string(),
    }
}

#[tokio::test]
async fn e2e_extract_to_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("diagram.json");
    let output = temp_dir.path().join("review.bpmn");
    fs::write(&input, SNAPSHOT).unwrap();

    let mut args = args(&input.to_string_lossy(), "SP1");
    args.output = Some(output.to_string_lossy().to_string());

    let outcome = run(&args).await.expect("extraction should succeed");
    assert_eq!(
        outcome,
        Outcome::Extracted {
            name: "Review".to_string(),
            xml: None
        }
    );

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<bpmn:userTask id=\"t2\" name=\"Task B\">"));
    assert!(xml.contains("<dc:Bounds x=\"100\" y=\"100\" width=\"100\" height=\"80\" />"));
    assert!(xml.contains("<di:waypoint x=\"200\" y=\"140\" />"));
}

#[tokio::test]
async fn e2e_config_and_padding() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("diagram.json");
    let config = temp_dir.path().join("config.json");
    fs::write(&input, SNAPSHOT).unwrap();
    fs::write(&config, r#"{"padding": 40, "indent": "    "}"#).unwrap();

    let mut args = args(&input.to_string_lossy(), "SP1");
    args.config = Some(config.to_string_lossy().to_string());

    let Outcome::Extracted { xml: Some(xml), .. } = run(&args).await.unwrap() else {
        panic!("expected the document on stdout");
    };
    assert!(xml.contains("\n    <bpmn:process "));
    assert!(xml.contains("<dc:Bounds x=\"40\" y=\"40\""));

    args.padding = Some(10.0);
    let Outcome::Extracted { xml: Some(xml), .. } = run(&args).await.unwrap() else {
        panic!("expected the document on stdout");
    };
    assert!(xml.contains("<dc:Bounds x=\"10\" y=\"10\""));
}

#[tokio::test]
async fn e2e_check_only() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("diagram.json");
    fs::write(&input, SNAPSHOT).unwrap();

    let mut args = args(&input.to_string_lossy(), "SP1");
    args.check = true;

    assert_eq!(
        run(&args).await.unwrap(),
        Outcome::Checked {
            has_nested_sub_processes: false,
            element_count: 3
        }
    );
}

#[tokio::test]
async fn e2e_errors() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("diagram.json");
    fs::write(&input, SNAPSHOT).unwrap();

    let missing = args(&temp_dir.path().join("nope.json").to_string_lossy(), "SP1");
    assert!(matches!(run(&missing).await, Err(CliError::Read { .. })));

    let unknown = args(&input.to_string_lossy(), "SP9");
    assert!(matches!(run(&unknown).await, Err(CliError::Extract(_))));
}
