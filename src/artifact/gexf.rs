//! GEXF export — serialize a graph for Gephi.
//!
//! Produces a GEXF 1.2 document that Gephi (and other GEXF-aware tools) can
//! open directly: directed edges, string node ids (the addresses
//! themselves, so downstream tools join on address identity), and
//! `year` / `value` / `block_number` edge attributes. Every edge gets its
//! own id, which is what preserves multigraph parallel edges through the
//! format.
//!
//! Export-only: the machine-readable round-trip format is the JSON
//! `GraphData` written alongside it.

use std::io::Write;

use crate::model::DiMultigraph;
use crate::Result;

/// Write `graph` as a GEXF document.
pub fn write_gexf(writer: &mut dyn Write, graph: &DiMultigraph) -> Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        writer,
        r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#
    )?;
    writeln!(writer, r#"  <graph defaultedgetype="directed" mode="static">"#)?;

    writeln!(writer, r#"    <attributes class="edge">"#)?;
    writeln!(writer, r#"      <attribute id="0" title="year" type="integer"/>"#)?;
    writeln!(writer, r#"      <attribute id="1" title="value" type="double"/>"#)?;
    writeln!(writer, r#"      <attribute id="2" title="block_number" type="long"/>"#)?;
    writeln!(writer, r#"    </attributes>"#)?;

    writeln!(writer, "    <nodes>")?;
    for address in graph.nodes() {
        let id = escape_xml(address.as_str());
        writeln!(writer, r#"      <node id="{id}" label="{id}"/>"#)?;
    }
    writeln!(writer, "    </nodes>")?;

    writeln!(writer, "    <edges>")?;
    for (edge_id, edge) in graph.edges().iter().enumerate() {
        let source = escape_xml(graph.address(edge.src).as_str());
        let target = escape_xml(graph.address(edge.dst).as_str());
        writeln!(
            writer,
            r#"      <edge id="{edge_id}" source="{source}" target="{target}">"#
        )?;
        writeln!(writer, "        <attvalues>")?;
        writeln!(writer, r#"          <attvalue for="0" value="{}"/>"#, edge.year)?;
        writeln!(writer, r#"          <attvalue for="1" value="{}"/>"#, edge.value)?;
        if let Some(block) = edge.block_number {
            writeln!(writer, r#"          <attvalue for="2" value="{block}"/>"#)?;
        }
        writeln!(writer, "        </attvalues>")?;
        writeln!(writer, "      </edge>")?;
    }
    writeln!(writer, "    </edges>")?;

    writeln!(writer, "  </graph>")?;
    writeln!(writer, "</gexf>")?;
    Ok(())
}

/// Escape the five XML special characters for attribute values.
fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Address;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn render(graph: &DiMultigraph) -> String {
        let mut buf = Vec::new();
        write_gexf(&mut buf, graph).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a&b"), "a&amp;b");
        assert_eq!(escape_xml("<x>"), "&lt;x&gt;");
        assert_eq!(escape_xml(r#"a"b'c"#), "a&quot;b&apos;c");
        assert_eq!(escape_xml("0xabc"), "0xabc");
    }

    #[test]
    fn test_gexf_document_shape() {
        let mut g = DiMultigraph::new();
        g.add_edge(addr("0xa"), addr("0xb"), 2018, 1.5);
        let doc = render(&g);

        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(doc.contains(r#"defaultedgetype="directed""#));
        assert!(doc.contains(r#"<node id="0xa" label="0xa"/>"#));
        assert!(doc.contains(r#"<edge id="0" source="0xa" target="0xb">"#));
        assert!(doc.contains(r#"<attvalue for="0" value="2018"/>"#));
        assert!(doc.contains(r#"<attvalue for="1" value="1.5"/>"#));
        assert!(doc.ends_with("</gexf>\n"));
    }

    #[test]
    fn test_parallel_edges_get_distinct_ids() {
        let mut g = DiMultigraph::new();
        g.add_edge(addr("0xa"), addr("0xb"), 2018, 1.0);
        g.add_edge(addr("0xa"), addr("0xb"), 2019, 1.0);
        let doc = render(&g);
        assert!(doc.contains(r#"<edge id="0" source="0xa" target="0xb">"#));
        assert!(doc.contains(r#"<edge id="1" source="0xa" target="0xb">"#));
    }

    #[test]
    fn test_block_number_attribute_is_optional() {
        let mut g = DiMultigraph::new();
        let s = g.add_node(addr("0xa"));
        let d = g.add_node(addr("0xb"));
        g.push_edge(crate::model::TxEdge::new(s, d, 2018, 1.0).with_block(17_000_000));
        let doc = render(&g);
        assert!(doc.contains(r#"<attvalue for="2" value="17000000"/>"#));
    }
}
