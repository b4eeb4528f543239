//! End-to-end pipeline scenarios: bytes in, bytes out, through reader,
//! verb chain and writer.

use std::io::BufRead;
use std::io::Cursor;

use similar_asserts::assert_eq;

use strec::options::{Format, Options, ReaderOpts, WriterOpts};
use strec::pipeline::run_with_sources;
use strec::verbs::make_chain;

fn opts(input: Format, output: Format) -> Options {
    Options {
        reader: ReaderOpts::for_format(input),
        writer: WriterOpts::for_format(output),
        files: Vec::new(),
        no_input: false,
    }
}

fn run(opts: &Options, chain: &[&str], input: &str) -> String {
    let tokens: Vec<String> = chain.iter().map(|s| s.to_string()).collect();
    let (verbs, files) = make_chain(&tokens, opts).unwrap();
    assert!(files.is_empty(), "test chains should not name files");
    let sources = vec![(
        "test".to_string(),
        Box::new(Cursor::new(input.to_string())) as Box<dyn BufRead>,
    )];
    let mut out = Vec::new();
    run_with_sources(opts, verbs, sources, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn run_dkvp(chain: &[&str], input: &str) -> String {
    run(&opts(Format::Dkvp, Format::Dkvp), chain, input)
}

#[test]
fn s1_format_conversion() {
    let out = run(
        &opts(Format::Csv, Format::Json),
        &["cat"],
        "a,b,c\r\n1,2,3\r\n4,5,6\r\n",
    );
    assert_eq!(
        out,
        "{\"a\":\"1\",\"b\":\"2\",\"c\":\"3\"}\n{\"a\":\"4\",\"b\":\"5\",\"c\":\"6\"}\n"
    );
}

#[test]
fn s2_group_stats() {
    let out = run_dkvp(
        &["stats1", "-a", "sum,count", "-f", "v", "-g", "g"],
        "g=x,v=1\ng=x,v=3\ng=y,v=10\n",
    );
    assert_eq!(out, "g=x,v_sum=4,v_count=2\ng=y,v_sum=10,v_count=1\n");
}

#[test]
fn s3_dsl_filter() {
    let out = run_dkvp(
        &["filter", "$a + $b > 5"],
        "a=1,b=2\na=3,b=4\na=5,b=6\n",
    );
    assert_eq!(out, "a=3,b=4\na=5,b=6\n");
}

#[test]
fn s4_dsl_accumulator_and_emit() {
    let out = run_dkvp(
        &["put", "-q", r#"@s[$k] += $x; end { emit @s, "k" }"#],
        "k=p,x=1\nk=q,x=2\nk=p,x=3\n",
    );
    assert_eq!(out, "k=p,s=4\nk=q,s=2\n");
}

#[test]
fn s5_uniq_with_counts() {
    let out = run_dkvp(&["uniq", "-g", "a", "-c"], "a=1\na=2\na=1\na=1\n");
    assert_eq!(out, "a=1,count=3\na=2,count=1\n");
}

#[test]
fn s6_csv_quoting_to_dkvp() {
    let out = run(
        &opts(Format::Csv, Format::Dkvp),
        &["cat"],
        "a,b\r\n\"x,y\",\"z\"\"w\"\r\n",
    );
    assert_eq!(out, "a=x\\,y,b=z\"w\n");
}

// ----------------------------------------------------------------
// invariants and laws

#[test]
fn cat_is_identity_on_dkvp() {
    let input = "a=1,b=2\nc=3\na=4,b=5\n";
    assert_eq!(run_dkvp(&["cat"], input), input);
}

#[test]
fn chain_starting_with_cat_equals_no_verbs() {
    let input = "a=1,b=2\na=3,b=4\n";
    let with_cat = run_dkvp(&["cat", "then", "head", "-n", "1"], input);
    let without = run_dkvp(&["head", "-n", "1"], input);
    assert_eq!(with_cat, without);
}

#[test]
fn rename_swap_twice_is_identity() {
    let input = "a=1,b=2\n";
    let once = run_dkvp(&["rename", "a,b,b,a"], input);
    let twice = run_dkvp(&["rename", "a,b,b,a"], &once);
    assert_eq!(twice, input);
}

#[test]
fn uniq_is_idempotent() {
    let input = "k=1\nk=2\nk=1\n";
    let once = run_dkvp(&["uniq", "-g", "k"], input);
    let twice = run_dkvp(&["uniq", "-g", "k"], &once);
    assert_eq!(once, twice);
}

#[test]
fn sort_is_stable() {
    let input = "k=a,i=1\nk=b,i=2\nk=a,i=3\n";
    let out = run_dkvp(&["sort", "-f", "k"], input);
    assert_eq!(out, "k=a,i=1\nk=a,i=3\nk=b,i=2\n");
}

#[test]
fn group_order_same_regardless_of_accumulators() {
    let input = "g=b,v=1\ng=a,v=2\ng=b,v=3\n";
    let sum = run_dkvp(&["stats1", "-a", "sum", "-f", "v", "-g", "g"], input);
    let multi = run_dkvp(
        &["stats1", "-a", "p50,count,mean", "-f", "v", "-g", "g"],
        input,
    );
    let order = |s: &str| -> Vec<String> {
        s.lines()
            .map(|l| l.split(',').next().unwrap().to_string())
            .collect()
    };
    assert_eq!(order(&sum), order(&multi));
}

#[test]
fn dkvp_line_round_trips() {
    let input = "x=10,y=hello,z=\n";
    assert_eq!(run_dkvp(&["cat"], input), input);
}

// ----------------------------------------------------------------
// reader/writer pairs

#[test]
fn csv_round_trip() {
    let input = "a,b\r\n1,2\r\n3,4\r\n";
    let out = run(&opts(Format::Csv, Format::Csv), &["cat"], input);
    assert_eq!(out, input);
}

#[test]
fn json_round_trip() {
    let input = "{\"a\":\"1\",\"b\":\"2\"}\n{\"a\":\"3\",\"b\":\"4\"}\n";
    let out = run(&opts(Format::Json, Format::Json), &["cat"], input);
    assert_eq!(out, input);
}

#[test]
fn xtab_round_trip() {
    let input = "a   1\nbee 2\n\na   3\nbee 4\n";
    let out = run(&opts(Format::Xtab, Format::Xtab), &["cat"], input);
    assert_eq!(out, input);
}

#[test]
fn pprint_alignment_and_round_trip() {
    let input = "a=1,bee=2\na=4444,bee=5\n";
    let pretty = run(&opts(Format::Dkvp, Format::Pprint), &["cat"], input);
    assert_eq!(pretty, "a    bee\n1    2\n4444 5\n");
    let back = run(&opts(Format::Pprint, Format::Dkvp), &["cat"], &pretty);
    assert_eq!(back, input);
}

#[test]
fn nidx_round_trip() {
    let input = "the quick fox\njumps over dogs\n";
    let out = run(&opts(Format::Nidx, Format::Nidx), &["cat"], input);
    assert_eq!(out, input);
}

#[test]
fn markdown_output() {
    let out = run(
        &opts(Format::Dkvp, Format::Markdown),
        &["cat"],
        "a=1,b=2\na=3,b=4\n",
    );
    assert_eq!(
        out,
        "| a | b |\n| --- | --- |\n| 1 | 2 |\n| 3 | 4 |\n"
    );
}

// ----------------------------------------------------------------
// longer chains

#[test]
fn chained_verbs() {
    let input = "g=x,v=1\ng=y,v=10\ng=x,v=3\ng=y,v=20\n";
    let out = run_dkvp(
        &[
            "filter", "$v > 1", "then", "stats1", "-a", "sum", "-f", "v", "-g", "g", "then",
            "sort", "-nr", "v_sum",
        ],
        input,
    );
    assert_eq!(out, "g=y,v_sum=30\ng=x,v_sum=3\n");
}

#[test]
fn put_then_cut() {
    let out = run_dkvp(
        &["put", "$c = $a . $b", "then", "cut", "-f", "c"],
        "a=x,b=y\n",
    );
    assert_eq!(out, "c=xy\n");
}

#[test]
fn snapshot_dkvp_to_json() {
    let out = run(&opts(Format::Dkvp, Format::Json), &["cat"], "a=1,b=two\n");
    insta::assert_snapshot!(out, @r#"{"a":"1","b":"two"}"#);
}

#[test]
fn tac_reverses() {
    let out = run_dkvp(&["tac"], "i=1\ni=2\ni=3\n");
    assert_eq!(out, "i=3\ni=2\ni=1\n");
}

#[test]
fn seqgen_with_no_input() {
    let o = opts(Format::Dkvp, Format::Dkvp);
    let out = run(&o, &["seqgen", "--start", "1", "--stop", "3"], "");
    assert_eq!(out, "i=1\ni=2\ni=3\n");
}

#[test]
fn implicit_csv_header_numbers_columns() {
    let mut o = opts(Format::Csv, Format::Dkvp);
    o.reader.implicit_csv_header = true;
    let out = run(&o, &["cat"], "7,8\r\n");
    assert_eq!(out, "1=7,2=8\n");
}

#[test]
fn json_nested_flattening_end_to_end() {
    let out = run(
        &opts(Format::Json, Format::Dkvp),
        &["cat"],
        r#"{"a":{"b":1},"c":"x"}"#,
    );
    assert_eq!(out, "a:b=1,c=x\n");
}

#[test]
fn dsl_absent_identity_and_error_propagation() {
    // absent is identity for +; arithmetic on non-numeric text yields (error)
    let out = run_dkvp(
        &["put", "$s = $missing + $a; $e = $a + $word"],
        "a=5,word=zebra\n",
    );
    assert_eq!(out, "a=5,word=zebra,s=5,e=(error)\n");
}

#[test]
fn csv_schema_change_within_file_is_fatal() {
    let tokens = vec!["cat".to_string()];
    let o = opts(Format::Csv, Format::Csv);
    let (verbs, _) = make_chain(&tokens, &o).unwrap();
    let sources = vec![(
        "test".to_string(),
        Box::new(Cursor::new("a,b\r\n1,2\r\n1,2,3\r\n".to_string())) as Box<dyn BufRead>,
    )];
    let mut out = Vec::new();
    assert!(run_with_sources(&o, verbs, sources, &mut out).is_err());
}
