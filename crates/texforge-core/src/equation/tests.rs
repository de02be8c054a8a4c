use super::*;
use crate::package::{cleanup, MergeMode};

const ALL: [Environment; 11] = [
    Environment::Equation,
    Environment::Align,
    Environment::Aligned,
    Environment::Gather,
    Environment::Gathered,
    Environment::Alignat,
    Environment::Alignedat,
    Environment::Cases,
    Environment::Flalign,
    Environment::Multline,
    Environment::Split,
];

fn joined(eq: &Equation) -> String {
    eq.lines().unwrap().join("\n")
}

fn cases() -> Equation {
    Equation::new()
        .environment(Environment::Cases, false)
        .add_lines(["0 & \\text{if $r-j$ is odd},", "1 & \\text{else},"])
}

#[test]
fn test_environment_roundtrip() {
    for env in ALL {
        let eq = Equation::new().environment(env, false);
        assert_eq!(eq.get_environment(), env);
        assert!(joined(&eq.columns(1)).contains(&format!("\\begin{{{}}}", env.name())));
    }
}

#[test]
fn test_label_only_in_labelable_environments() {
    let expected = "\\label{eq:testlabel-0}";
    for env in ALL {
        let eq = Equation::new()
            .environment(env, false)
            .columns(2)
            .label("testlabel")
            .line("E &= mc^2", true);
        assert_eq!(
            joined(&eq).contains(expected),
            !env.math_mode_only(),
            "unexpected labelling for {}",
            env
        );
        assert!(!joined(&eq.without_label()).contains(expected));
    }
}

#[test]
fn test_equation_holds_single_label() {
    let eq = Equation::new().label("L").add_lines(["a", "b"]);
    let text = joined(&eq);
    assert_eq!(text.matches("\\label{").count(), 1);
    assert!(text.contains("b \\label{eq:L-0}"));
}

#[test]
fn test_align_labels_every_statement() {
    let eq = Equation::new()
        .environment(Environment::Align, false)
        .label("L")
        .add_lines(["a", "b"]);
    assert_eq!(
        eq.lines().unwrap(),
        vec![
            "    \\begin{align}%",
            "        a \\label{eq:L-0}\\\\%",
            "        b \\label{eq:L-1}",
            "    \\end{align}%",
        ]
    );
}

#[test]
fn test_continued_lines_share_label() {
    let eq = Equation::new()
        .environment(Environment::Align, false)
        .label("L")
        .line("a &= b", false)
        .line("&+ c", true)
        .line("d &= e", true);
    let lines = eq.lines().unwrap();
    assert!(!lines[1].contains("\\label"));
    assert!(lines[2].contains("\\label{eq:L-0}"));
    assert!(lines[3].contains("\\label{eq:L-1}"));
}

#[test]
fn test_replace_with() {
    let eq = Equation::new().label("label").line("E = mc^2", true);
    let other = Equation::new()
        .environment(Environment::Align, false)
        .label("different smth")
        .line("a &= b", true);

    let eq = eq.replace_with(other);
    assert_eq!(eq.get_environment(), Environment::Align);
    assert_eq!(eq.get_label(), Some("different smth"));
    let text = joined(&eq);
    assert!(text.contains("a &= b"));
    assert!(!text.contains("E = mc^2"));
}

#[test]
fn test_nested_cases_inline() {
    let eq = Equation::new()
        .label("label")
        .line("E = mc^2", false)
        .nest(cases(), false)
        .unwrap()
        .line("+\\xi", true);

    assert_eq!(
        eq.lines().unwrap(),
        vec![
            "    \\begin{equation}%",
            "        E = mc^2 ",
            "        \\begin{cases}%",
            "            0 & \\text{if $r-j$ is odd}, \\\\%",
            "            1 & \\text{else},            ",
            "        \\end{cases}%",
            "        +\\xi     \\label{eq:label-0}",
            "    \\end{equation}%",
        ]
    );
}

#[test]
fn test_nested_cases_last() {
    let eq = Equation::new()
        .label("label")
        .line("E = mc^2", false)
        .nest(cases(), true)
        .unwrap();

    assert_eq!(
        eq.lines().unwrap(),
        vec![
            "    \\begin{equation}%",
            "        E = mc^2 ",
            "        \\begin{cases}%",
            "            0 & \\text{if $r-j$ is odd}, \\\\%",
            "            1 & \\text{else},            ",
            "        \\end{cases}%",
            "        \\label{eq:label-0}",
            "    \\end{equation}%",
        ]
    );
}

#[test]
fn test_nest_rejects_top_level_environment() {
    let child = Equation::new().add_lines(["a", "b"]);
    let result = Equation::new().label("label").nest(child, false);
    assert!(matches!(result, Err(Error::Usage(_))));
}

#[test]
fn test_intertext() {
    let eq = Equation::new()
        .environment(Environment::Align, false)
        .label("label")
        .line("E &= mc^2", true)
        .intertext("Some intermediate text")
        .line("&=\\xi", true);

    assert_eq!(
        eq.lines().unwrap(),
        vec![
            "    \\begin{align}%",
            "        E &= mc^2                          \\label{eq:label-0}\\\\%",
            "        \\intertext{Some intermediate text} ",
            "        &=\\xi                              \\label{eq:label-1}",
            "    \\end{align}%",
        ]
    );
}

#[test]
fn test_subequations() {
    let build = |label: Option<&str>| {
        let eq = Equation::new()
            .environment(Environment::Align, false)
            .use_subequations(true)
            .line("E &= mc^2", true)
            .intertext("Some intermediate text")
            .line("&=\\xi", true);
        match label {
            Some(l) => eq.label(l),
            None => eq,
        }
    };

    assert_eq!(
        build(Some("label")).lines().unwrap(),
        vec![
            "    \\begin{subequations}\\label{eq:label}",
            "        \\begin{align}%",
            "            E &= mc^2                          \\label{eq:label-0}\\\\%",
            "            \\intertext{Some intermediate text} ",
            "            &=\\xi                              \\label{eq:label-1}",
            "        \\end{align}%",
            "    \\end{subequations}",
        ]
    );

    assert_eq!(
        build(None).lines().unwrap(),
        vec![
            "    \\begin{subequations}",
            "        \\begin{align}%",
            "            E &= mc^2                          \\\\%",
            "            \\intertext{Some intermediate text} ",
            "            &=\\xi                              ",
            "        \\end{align}%",
            "    \\end{subequations}",
        ]
    );
}

#[test]
fn test_starred_drops_label() {
    let expected = vec![
        "    \\begin{align*}%",
        "        E &= mc^2                          \\\\%",
        "        \\intertext{Some intermediate text} ",
        "        &=\\xi                              ",
        "    \\end{align*}%",
    ];
    let content = |eq: Equation| {
        eq.label("label")
            .line("E &= mc^2", true)
            .intertext("Some intermediate text")
            .line("&=\\xi", true)
    };

    let direct = content(Equation::new().environment(Environment::Align, true));
    assert_eq!(direct.lines().unwrap(), expected);

    let later = content(Equation::new().environment(Environment::Align, false).starred(true));
    assert_eq!(later.lines().unwrap(), expected);
}

#[test]
fn test_star_ignored_where_unsupported() {
    let eq = Equation::new().environment(Environment::Split, true);
    assert!(!eq.is_starred());
    assert!(joined(&eq).contains("\\begin{split}%"));

    let eq = Equation::new().environment(Environment::Cases, false).starred(true);
    assert!(!eq.starred);
    assert!(!eq.is_starred());
}

#[test]
fn test_empty_equation() {
    assert_eq!(
        Equation::new().lines().unwrap(),
        vec!["    \\begin{equation}%", "    \\end{equation}%"]
    );

    let eq = Equation::new().label("empty").use_subequations(true);
    assert_eq!(
        eq.lines().unwrap(),
        vec![
            "    \\begin{subequations}\\label{eq:empty}",
            "        \\begin{equation}%",
            "        \\end{equation}%",
            "    \\end{subequations}",
        ]
    );
}

#[test]
fn test_columns_required() {
    let eq = Equation::new()
        .environment(Environment::Alignat, true)
        .label("label")
        .add_lines(["E &= mc^2", "&=\\xi"]);
    assert!(matches!(eq.lines(), Err(Error::Configuration(_))));

    let eq = eq.environment(Environment::Alignedat, false);
    assert!(matches!(eq.lines(), Err(Error::Configuration(_))));

    let eq = eq.environment(Environment::Alignat, false).columns(2);
    assert_eq!(eq.lines().unwrap()[0], "    \\begin{alignat}{2}%");
}

#[test]
fn test_packages_merge() {
    let eq = Equation::new()
        .with_package(Package::new("a").unwrap())
        .with_package(Package::new("b").unwrap())
        .with_package(Package::new("a").unwrap())
        .with_package(Package::new("c").unwrap().with_value("key", "val"));

    let needed = cleanup(&eq.packages(), MergeMode::Override);
    for name in ["amsmath", "a", "b", "c"] {
        assert!(needed.iter().any(|p| p.name() == name));
    }
    let c = needed.iter().find(|p| p.name() == "c").unwrap();
    assert_eq!(c.options()["key"], "val");

    let eq = eq.with_package(Package::new("c").unwrap().with_value("key", "val2"));
    let needed = cleanup(&eq.packages(), MergeMode::Override);
    let c = needed.iter().find(|p| p.name() == "c").unwrap();
    assert_eq!(c.options()["key"], "val2");
}

#[test]
fn test_nested_packages_are_reported() {
    let child = cases().with_package(Package::new("mathtools").unwrap());
    let eq = Equation::new().nest(child, true).unwrap();
    assert!(eq.packages().iter().any(|p| p.name() == "mathtools"));
}

#[test]
fn test_amsmath_declares_breqn_incompatible() {
    let eq = Equation::new();
    let amsmath = &eq.packages()[0];
    assert_eq!(amsmath.name(), "amsmath");
    assert!(amsmath.incompatibilities()["breqn"].contains("Equation"));
}
