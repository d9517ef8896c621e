//! Classification and ranking metrics.

mod accuracy;
mod confmat;
mod counts;
mod ndcg;
mod ranking;
mod scores;
mod topk;

pub use accuracy::{accuracy, balanced_accuracy};
pub use confmat::{
    binary_confusion_matrix, confusion_matrix, multiclass_confusion_matrix,
    multilabel_confusion_matrix,
};
pub use ndcg::ndcg;
pub use ranking::{
    average_precision, binary_average_precision, binary_roc_auc, multiclass_average_precision,
    multiclass_roc_auc, multilabel_average_precision, multilabel_roc_auc, roc_auc,
};
pub use scores::{
    binary_fbeta_score, binary_jaccard, binary_precision, binary_recall, fbeta_score, jaccard,
    multiclass_fbeta_score, multiclass_jaccard, multiclass_precision, multiclass_recall,
    multilabel_fbeta_score, multilabel_jaccard, multilabel_precision, multilabel_recall, precision,
    recall,
};
pub use topk::{binary_top_k_accuracy, multiclass_top_k_accuracy, top_k_accuracy};
