//! Table (`a:tbl`) parsing.

use crate::model::table::{CellBorders, Table, TableCell, TableColumn, TableRow};
use crate::pptx::{fill, text, ParseContext};
use crate::units::Emu;
use crate::xml::XmlNode;

pub fn parse_table(tbl: &XmlNode, ctx: &ParseContext) -> Table {
    let columns = tbl
        .child("tblGrid")
        .map(|grid| {
            grid.children("gridCol")
                .map(|col| TableColumn {
                    width: Emu(col.attr_i64("w").unwrap_or(0)),
                })
                .collect()
        })
        .unwrap_or_default();

    let rows = tbl.children("tr").map(|tr| parse_row(tr, ctx)).collect();

    Table { columns, rows }
}

fn parse_row(tr: &XmlNode, ctx: &ParseContext) -> TableRow {
    TableRow {
        height: Emu(tr.attr_i64("h").unwrap_or(0)),
        cells: tr.children("tc").map(|tc| parse_cell(tc, ctx)).collect(),
    }
}

fn parse_cell(tc: &XmlNode, ctx: &ParseContext) -> TableCell {
    let text_body = tc
        .child("txBody")
        .map(|body| text::parse_text_body(body, ctx))
        .filter(|body| body.has_text());

    let mut cell = TableCell {
        text_body,
        fill: None,
        borders: None,
        grid_span: tc.attr_i64("gridSpan").unwrap_or(1).max(1) as usize,
        row_span: tc.attr_i64("rowSpan").unwrap_or(1).max(1) as usize,
        h_merge: tc.attr_bool("hMerge"),
        v_merge: tc.attr_bool("vMerge"),
    };

    if let Some(tc_pr) = tc.child("tcPr") {
        cell.fill = fill::parse_fill_in(tc_pr, ctx);
        let borders = CellBorders {
            left: tc_pr.child("lnL").and_then(|ln| fill::parse_outline(ln, ctx)),
            right: tc_pr.child("lnR").and_then(|ln| fill::parse_outline(ln, ctx)),
            top: tc_pr.child("lnT").and_then(|ln| fill::parse_outline(ln, ctx)),
            bottom: tc_pr.child("lnB").and_then(|ln| fill::parse_outline(ln, ctx)),
        };
        if !borders.is_empty() {
            cell.borders = Some(borders);
        }
    }

    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{PptxContainer, Relationships};
    use crate::model::presentation::ColorMap;
    use crate::model::{Fill, ResolvedColor, Theme};
    use crate::warnings::WarningCollector;

    struct Fixture {
        container: PptxContainer,
        rels: Relationships,
        theme: Theme,
        color_map: ColorMap,
        warnings: WarningCollector,
    }

    impl Fixture {
        fn new() -> Self {
            let empty_zip = vec![
                0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            ];
            Self {
                container: PptxContainer::from_bytes(empty_zip).unwrap(),
                rels: Relationships::new(),
                theme: Theme::default(),
                color_map: ColorMap::identity(),
                warnings: WarningCollector::default(),
            }
        }

        fn ctx(&self) -> ParseContext<'_> {
            ParseContext {
                container: &self.container,
                part_path: "ppt/slides/slide1.xml",
                rels: &self.rels,
                theme: &self.theme,
                color_map: &self.color_map,
                warnings: &self.warnings,
                location: "Slide 1".to_string(),
            }
        }
    }

    #[test]
    fn test_grid_rows_and_cells() {
        let fx = Fixture::new();
        let tbl = XmlNode::parse(
            r#"<a:tbl xmlns:a="a">
                 <a:tblGrid>
                   <a:gridCol w="1828800"/>
                   <a:gridCol w="2743200"/>
                 </a:tblGrid>
                 <a:tr h="370840">
                   <a:tc>
                     <a:txBody><a:bodyPr/><a:p><a:r><a:t>Name</a:t></a:r></a:p></a:txBody>
                     <a:tcPr><a:solidFill><a:srgbClr val="4472C4"/></a:solidFill></a:tcPr>
                   </a:tc>
                   <a:tc>
                     <a:txBody><a:bodyPr/><a:p><a:r><a:t>Value</a:t></a:r></a:p></a:txBody>
                   </a:tc>
                 </a:tr>
               </a:tbl>"#,
        )
        .unwrap();
        let table = parse_table(&tbl, &fx.ctx());
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].width, Emu(2_743_200));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].height, Emu(370_840));
        let cells = &table.rows[0].cells;
        assert_eq!(cells.len(), 2);
        assert_eq!(
            cells[0].fill,
            Some(Fill::Solid {
                color: ResolvedColor::opaque("#4472C4")
            })
        );
        assert!(cells[0].text_body.is_some());
        assert!(cells[1].fill.is_none());
    }

    #[test]
    fn test_merge_flags_and_spans() {
        let fx = Fixture::new();
        let tbl = XmlNode::parse(
            r#"<a:tbl xmlns:a="a">
                 <a:tblGrid><a:gridCol w="914400"/><a:gridCol w="914400"/></a:tblGrid>
                 <a:tr h="370840">
                   <a:tc gridSpan="2"><a:txBody><a:bodyPr/><a:p/></a:txBody></a:tc>
                   <a:tc hMerge="1"><a:txBody><a:bodyPr/><a:p/></a:txBody></a:tc>
                 </a:tr>
                 <a:tr h="370840">
                   <a:tc rowSpan="2"><a:txBody><a:bodyPr/><a:p/></a:txBody></a:tc>
                   <a:tc vMerge="1"><a:txBody><a:bodyPr/><a:p/></a:txBody></a:tc>
                 </a:tr>
               </a:tbl>"#,
        )
        .unwrap();
        let table = parse_table(&tbl, &fx.ctx());
        assert_eq!(table.rows[0].cells[0].grid_span, 2);
        assert!(table.rows[0].cells[1].h_merge);
        assert_eq!(table.rows[1].cells[0].row_span, 2);
        assert!(table.rows[1].cells[1].v_merge);
    }

    #[test]
    fn test_cell_borders() {
        let fx = Fixture::new();
        let tbl = XmlNode::parse(
            r#"<a:tbl xmlns:a="a">
                 <a:tblGrid><a:gridCol w="914400"/></a:tblGrid>
                 <a:tr h="370840">
                   <a:tc>
                     <a:txBody><a:bodyPr/><a:p/></a:txBody>
                     <a:tcPr>
                       <a:lnB w="25400"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></a:lnB>
                     </a:tcPr>
                   </a:tc>
                 </a:tr>
               </a:tbl>"#,
        )
        .unwrap();
        let table = parse_table(&tbl, &fx.ctx());
        let borders = table.rows[0].cells[0].borders.as_ref().unwrap();
        assert!(borders.top.is_none());
        let bottom = borders.bottom.as_ref().unwrap();
        assert_eq!(bottom.width, Emu(25_400));
    }
}
