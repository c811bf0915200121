//! Tests for import consolidation and the style pass.
use kumitate::config::StyleOptions;
use kumitate::error::NormalizeError;
use kumitate::normalizer::{normalize, normalize_with};

#[test]
fn test_imports_are_hoisted_and_merged() {
    let source = "import os, sys\nfrom typing import List\ndef f():\n    return 1\nfrom typing import Dict\nimport os\n";
    assert_eq!(
        normalize(source).unwrap(),
        "from typing import Dict, List\nimport os\nimport sys\n\n\ndef f():\n    return 1\n"
    );
}

#[test]
fn test_future_imports_stay_first() {
    let source = "import abc\nfrom __future__ import annotations\nx = 1\n";
    assert_eq!(
        normalize(source).unwrap(),
        "from __future__ import annotations\nimport abc\n\nx = 1\n"
    );
}

#[test]
fn test_parenthesized_import_is_parsed() {
    let source = "from collections import (\n    deque,  # queue\n    Counter,\n)\nfrom collections import deque\n";
    assert_eq!(
        normalize(source).unwrap(),
        "from collections import Counter, deque  # queue\n"
    );
}

#[test]
fn test_long_import_is_wrapped() {
    let style = StyleOptions {
        line_length: 40,
        ..StyleOptions::default()
    };
    let source = "from collections import namedtuple, OrderedDict, defaultdict\n";
    let expected = "from collections import (\n    OrderedDict,\n    defaultdict,\n    namedtuple,\n)\n";
    assert_eq!(normalize_with(source, &style).unwrap(), expected);
    assert_eq!(normalize_with(expected, &style).unwrap(), expected);
}

#[test]
fn test_nested_imports_are_untouched() {
    let source = "def f():\n    import os\n    return os.getcwd()\n";
    assert_eq!(normalize(source).unwrap(), source);
}

#[test]
fn test_string_contents_are_preserved() {
    let source = "def f():\n    s = \"\"\"\nimport os   \n    trailing   \n\n\n\n\"\"\"\n    return s\n";
    assert_eq!(normalize(source).unwrap(), source);
}

#[test]
fn test_blank_lines_are_capped() {
    assert_eq!(normalize("\n\n\nx = 1\n\n\n\n\ny = 2\n\n\n").unwrap(), "x = 1\n\n\ny = 2\n");
    assert_eq!(normalize("x = 1\ny = 2").unwrap(), "x = 1\ny = 2\n");
}

#[test]
fn test_definitions_are_separated_by_two_blank_lines() {
    let source = "x = 1\ndef f():\n    pass\ny = 2\nclass A:\n    pass\n";
    assert_eq!(
        normalize(source).unwrap(),
        "x = 1\n\n\ndef f():\n    pass\n\n\ny = 2\n\n\nclass A:\n    pass\n"
    );
}

#[test]
fn test_comments_and_decorators_travel_with_definition() {
    let source = "import functools\nx = 1\n# cached helper\n@functools.cache\n\ndef f():\n    return x\n";
    assert_eq!(
        normalize(source).unwrap(),
        "import functools\n\nx = 1\n\n\n# cached helper\n@functools.cache\ndef f():\n    return x\n"
    );
}

#[test]
fn test_whitespace_is_cleaned() {
    assert_eq!(
        normalize("def f():\n\treturn 1   \n").unwrap(),
        "def f():\n    return 1\n"
    );
}

#[test]
fn test_blank_lines_inside_bodies_are_capped_at_one() {
    assert_eq!(
        normalize("def f():\n    a = 1\n\n\n    return a\n").unwrap(),
        "def f():\n    a = 1\n\n    return a\n"
    );
}

#[test]
fn test_unterminated_string_is_unparsable() {
    assert!(matches!(
        normalize("x = 1\ns = 'abc\n"),
        Err(NormalizeError::UnparsableSource { line, .. }) if line >= 2
    ));
    assert!(matches!(
        normalize("s = \"\"\"abc\n"),
        Err(NormalizeError::UnparsableSource { .. })
    ));
}

#[test]
fn test_unbalanced_brackets_are_unparsable() {
    assert!(matches!(
        normalize("x = (1,\n     2\n"),
        Err(NormalizeError::UnparsableSource { .. })
    ));
    assert!(matches!(
        normalize("x = 1)\n"),
        Err(NormalizeError::UnparsableSource { line: 1, .. })
    ));
    assert!(matches!(
        normalize("x = [1, 2)\n"),
        Err(NormalizeError::UnparsableSource { line: 1, .. })
    ));
}

#[test]
fn test_invalid_syntax_is_unparsable() {
    assert!(matches!(
        normalize("def f()\n    return 1\n"),
        Err(NormalizeError::UnparsableSource { .. })
    ));
    assert!(matches!(
        normalize("x = = 1\n"),
        Err(NormalizeError::UnparsableSource { line: 1, .. })
    ));
    assert!(matches!(
        normalize("y = 2\nclass:\n    pass\n"),
        Err(NormalizeError::UnparsableSource { line: 2, .. })
    ));
}

#[test]
fn test_star_import_is_kept_apart() {
    let source = "from m import *\nfrom m import x\nprint(x)\n";
    let expected = "from m import *\nfrom m import x\n\nprint(x)\n";
    assert_eq!(normalize(source).unwrap(), expected);
    assert_eq!(normalize(expected).unwrap(), expected);
}

#[test]
fn test_module_docstring_stays_above_imports() {
    let source = "\"\"\"Module doc.\"\"\"\nimport os\nx = os.sep\n";
    assert_eq!(
        normalize(source).unwrap(),
        "\"\"\"Module doc.\"\"\"\n\nimport os\n\nx = os.sep\n"
    );
}

#[test]
fn test_header_comments_stay_above_imports() {
    let source = "#!/usr/bin/env python\n# utilities\nx = 1\nimport sys\n";
    let expected = "#!/usr/bin/env python\n# utilities\n\nimport sys\n\nx = 1\n";
    assert_eq!(normalize(source).unwrap(), expected);
    assert_eq!(normalize(expected).unwrap(), expected);
}

#[test]
fn test_inline_import_comments_are_kept() {
    let source = "from a import b  # keep\n";
    assert_eq!(normalize(source).unwrap(), source);
    assert_eq!(
        normalize("import os  # paths\nimport os\n").unwrap(),
        "import os  # paths\n"
    );
}

#[test]
fn test_brackets_and_quotes_in_comments_and_strings_are_ignored() {
    let source = "x = \"(\"  # don't ]\ny = '\\''\n";
    assert_eq!(normalize(source).unwrap(), source);
}

#[test]
fn test_normalize_is_idempotent() {
    let samples = [
        "import os, sys\nfrom typing import List\ndef f():\n    return 1\nfrom typing import Dict\n",
        "\n\nx = 1\n\n\n\n# note\n\n\nclass A:\n\n    def m(self):\n        return '''\n   keep   \n'''\ny = [\n    1,\n\n    2,\n]\n",
        "from a import (b,\n    c)\nimport z\n@dec\n# why\ndef g():\n\tpass\n\n\n\n\nh = g()   \n",
        "value = compute(\n    1,\n)  \\\n    + 2\nimport late\n",
        "\"\"\"Doc.\n\nMore.\n\"\"\"\n# note\nfrom m import *  # all\nimport os  # paths\nrun(os)\n",
        "",
    ];
    for sample in samples {
        let once = normalize(sample).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice, "not idempotent for {:?}", sample);
    }
}
