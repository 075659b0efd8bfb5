//! 랜덤 포레스트 분류기.
//!
//! 부트스트랩 샘플링된 Gini 결정 트리 앙상블입니다. 성공/실패 클래스
//! 비율이 치우친 데이터셋을 다루므로 역빈도 클래스 가중을 사용하고,
//! 분할마다 feature 일부(√개수)만 후보로 봅니다.
//!
//! 모든 무작위성은 호출자가 넘긴 RNG에서 나옵니다. 같은 시드와 같은
//! 데이터면 같은 포레스트가 나옵니다.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{MlError, MlResult};

/// 포레스트 하이퍼파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestParams {
    /// 트리 개수
    pub n_trees: usize,
    /// 트리 최대 깊이
    pub max_depth: usize,
    /// 분할에 필요한 최소 샘플 수
    pub min_samples_split: usize,
    /// 리프에 필요한 최소 샘플 수
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 150,
            max_depth: 15,
            min_samples_split: 50,
            min_samples_leaf: 20,
        }
    }
}

/// 결정 트리 노드.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TreeNode {
    /// 리프: 가중 성공 비율
    Leaf { p_success: f32 },
    /// 분할: feature <= threshold 이면 왼쪽
    Split {
        feature: usize,
        threshold: f32,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, x: &[f32]) -> f32 {
        match self {
            TreeNode::Leaf { p_success } => *p_success,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x[*feature] <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }
}

/// 랜덤 포레스트 분류기.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<TreeNode>,
    n_features: usize,
}

impl RandomForest {
    /// 포레스트를 학습합니다.
    ///
    /// `x`는 샘플별 feature 배열, `y`는 성공 여부입니다. 클래스 가중은
    /// 역빈도(balanced)로 계산합니다.
    pub fn fit(
        x: &[Vec<f32>],
        y: &[bool],
        params: &ForestParams,
        rng: &mut StdRng,
    ) -> MlResult<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(MlError::InvalidInput(format!(
                "sample count mismatch: {} features, {} labels",
                x.len(),
                y.len()
            )));
        }

        let n_features = x[0].len();
        if x.iter().any(|row| row.len() != n_features) {
            return Err(MlError::InvalidInput(
                "inconsistent feature dimensions".to_string(),
            ));
        }

        let n_success = y.iter().filter(|&&s| s).count();
        let n_failure = y.len() - n_success;
        if n_success == 0 || n_failure == 0 {
            return Err(MlError::Training(
                "both outcome classes are required for training".to_string(),
            ));
        }

        // 역빈도 클래스 가중 (balanced)
        let n = y.len() as f64;
        let w_success = n / (2.0 * n_success as f64);
        let w_failure = n / (2.0 * n_failure as f64);
        let weights: Vec<f64> = y
            .iter()
            .map(|&s| if s { w_success } else { w_failure })
            .collect();

        let n_candidates = (n_features as f64).sqrt().ceil() as usize;
        let builder = TreeBuilder {
            x,
            y,
            weights: &weights,
            params,
            n_features,
            n_candidates: n_candidates.max(1),
        };

        let trees = (0..params.n_trees)
            .map(|_| {
                let sample: Vec<usize> =
                    (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();
                builder.build(&sample, 0, rng)
            })
            .collect();

        Ok(Self { trees, n_features })
    }

    /// 성공 클래스 확률을 예측합니다 (트리 평균).
    pub fn predict_proba(&self, x: &[f32]) -> MlResult<f32> {
        if x.len() != self.n_features {
            return Err(MlError::InvalidInput(format!(
                "expected {} features, got {}",
                self.n_features,
                x.len()
            )));
        }

        let sum: f32 = self.trees.iter().map(|t| t.predict(x)).sum();
        Ok(sum / self.trees.len() as f32)
    }

    /// feature 개수를 반환합니다.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// 트리 개수를 반환합니다.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// 트리 빌더 - 학습 데이터에 대한 공유 뷰.
struct TreeBuilder<'a> {
    x: &'a [Vec<f32>],
    y: &'a [bool],
    weights: &'a [f64],
    params: &'a ForestParams,
    n_features: usize,
    n_candidates: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize, rng: &mut StdRng) -> TreeNode {
        let p = self.weighted_success_ratio(indices);

        let is_pure = p <= f64::EPSILON || p >= 1.0 - f64::EPSILON;
        if depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split
            || is_pure
        {
            return TreeNode::Leaf { p_success: p as f32 };
        }

        let Some((feature, threshold)) = self.best_split(indices, rng) else {
            return TreeNode::Leaf { p_success: p as f32 };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.x[i][feature] <= threshold);

        let left = self.build(&left_idx, depth + 1, rng);
        let right = self.build(&right_idx, depth + 1, rng);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn weighted_success_ratio(&self, indices: &[usize]) -> f64 {
        let mut total = 0.0;
        let mut success = 0.0;
        for &i in indices {
            total += self.weights[i];
            if self.y[i] {
                success += self.weights[i];
            }
        }
        if total <= 0.0 {
            return 0.0;
        }
        success / total
    }

    /// 후보 feature 중 가중 Gini 불순도를 가장 줄이는 분할을 찾습니다.
    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<(usize, f32)> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);
        features.truncate(self.n_candidates);
        // 후보 순서가 RNG 호출 이력에 영향을 주지 않도록 정렬
        features.sort_unstable();

        let mut best: Option<(usize, f32, f64)> = None;

        for &feature in &features {
            let mut sorted: Vec<usize> = indices.to_vec();
            sorted.sort_by(|&a, &b| {
                self.x[a][feature]
                    .partial_cmp(&self.x[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let total_w: f64 = sorted.iter().map(|&i| self.weights[i]).sum();
            let total_sw: f64 = sorted
                .iter()
                .filter(|&&i| self.y[i])
                .map(|&i| self.weights[i])
                .sum();

            let mut left_w = 0.0;
            let mut left_sw = 0.0;

            for (pos, window) in sorted.windows(2).enumerate() {
                let (i, j) = (window[0], window[1]);
                left_w += self.weights[i];
                if self.y[i] {
                    left_sw += self.weights[i];
                }

                let (vi, vj) = (self.x[i][feature], self.x[j][feature]);
                if vi == vj {
                    continue;
                }

                let left_count = pos + 1;
                let right_count = sorted.len() - left_count;
                if left_count < self.params.min_samples_leaf
                    || right_count < self.params.min_samples_leaf
                {
                    continue;
                }

                let right_w = total_w - left_w;
                let right_sw = total_sw - left_sw;
                let score = weighted_gini(left_w, left_sw) + weighted_gini(right_w, right_sw);

                let threshold = (vi + vj) / 2.0;
                let improves = match best {
                    None => true,
                    Some((_, _, best_score)) => score < best_score,
                };
                if improves {
                    best = Some((feature, threshold, score));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

/// 부분 집합의 가중 Gini 불순도 × 가중치 합.
fn weighted_gini(total_w: f64, success_w: f64) -> f64 {
    if total_w <= 0.0 {
        return 0.0;
    }
    let p = success_w / total_w;
    total_w * 2.0 * p * (1.0 - p)
}
