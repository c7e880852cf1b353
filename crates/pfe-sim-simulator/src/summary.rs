use crate::report::AnalysisReport;

/// One CSV line per (method, network): `method, network, total cost`.
pub fn cost_summary(report: &AnalysisReport) -> String {
    report
        .methods
        .iter()
        .flat_map(|method| {
            method.results_by_network.iter().map(move |network| {
                format!(
                    "{}, {}, {:.1}\n",
                    method.method_name, network.network_model_name, network.total_cost
                )
            })
        })
        .collect()
}
